use std::{fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::UserType,
    protocol::{ChatResponse, ChatUiRequest, EngineStatusResponse},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod draft;
pub mod error;
pub mod session_id;
pub mod transcript;
pub mod transport;

pub use error::{TransportError, ValidationError};
pub use transcript::{ChatMessage, MessageSender};
pub use transport::{Endpoints, HttpChatTransport};

use crate::{draft::MAX_MESSAGE_CHARS, session_id::format_session_id};

pub const MIN_USERNAME_CHARS: usize = 2;
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The remote chat service, as seen by the controller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, request: &ChatUiRequest) -> Result<ChatResponse, TransportError>;
    async fn engine_status(&self) -> Result<EngineStatusResponse, TransportError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Chat,
}

/// What the engine indicator shows. Status query failures end up here and
/// nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineStatus {
    #[default]
    Pending,
    Active(String),
    Unknown,
    Offline,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Pending => f.write_str("Engine: …"),
            EngineStatus::Active(name) => write!(f, "Engine: {}", name.to_uppercase()),
            EngineStatus::Unknown => f.write_str("Engine: Unknown"),
            EngineStatus::Offline => f.write_str("Engine: Offline"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    ViewChanged(View),
    SessionStarted { session_id: String },
    MessageAppended(ChatMessage),
    BusyChanged(bool),
    EngineStatusChanged(EngineStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Empty,
    TooLong,
    Busy,
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    FellBack,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub view: View,
    pub user_id: Option<String>,
    pub user_type: UserType,
    pub session_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub busy: bool,
    pub engine: EngineStatus,
}

impl ControllerSnapshot {
    /// Banner text, e.g. `al (customer)`.
    pub fn user_display(&self) -> Option<String> {
        self.user_id
            .as_ref()
            .map(|user_id| format!("{user_id} ({})", self.user_type.display_name()))
    }
}

struct ControllerState {
    view: View,
    user_id: Option<String>,
    user_type: UserType,
    session_id: Option<String>,
    /// Next value used in a session id. Resets on logout only.
    session_counter: u64,
    /// Bumped whenever the current session is replaced or torn down, so a
    /// reply for an older session is not folded into the new history.
    session_epoch: u64,
    messages: Vec<ChatMessage>,
    busy: bool,
    engine: EngineStatus,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            view: View::Login,
            user_id: None,
            user_type: UserType::default(),
            session_id: None,
            session_counter: 1,
            session_epoch: 0,
            messages: Vec::new(),
            busy: false,
            engine: EngineStatus::Pending,
        }
    }
}

/// Owns identity, session and history for one chat user, and drives the
/// request/response cycle against a [`ChatTransport`].
pub struct SessionController {
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl SessionController {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Arc<Self> {
        Self::new_with_clock(transport, Arc::new(SystemClock))
    }

    pub fn new_with_clock(transport: Arc<dyn ChatTransport>, clock: Arc<dyn Clock>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            transport,
            clock,
            inner: Mutex::new(ControllerState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine; the snapshot stays authoritative.
        let _ = self.events.send(event);
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let guard = self.inner.lock().await;
        ControllerSnapshot {
            view: guard.view,
            user_id: guard.user_id.clone(),
            user_type: guard.user_type,
            session_id: guard.session_id.clone(),
            messages: guard.messages.clone(),
            busy: guard.busy,
            engine: guard.engine.clone(),
        }
    }

    pub async fn has_active_session(&self) -> bool {
        self.inner.lock().await.user_id.is_some()
    }

    /// Sets identity and starts the first session. Returns the new session id.
    pub async fn login(
        &self,
        username: &str,
        user_type: UserType,
    ) -> Result<String, ValidationError> {
        let username = username.trim();
        let actual = username.chars().count();
        if actual < MIN_USERNAME_CHARS {
            return Err(ValidationError::UsernameTooShort {
                min: MIN_USERNAME_CHARS,
                actual,
            });
        }

        let mut guard = self.inner.lock().await;
        guard.user_id = Some(username.to_string());
        guard.user_type = user_type;
        let session_id = self.start_session(&mut guard, username.to_string());
        guard.view = View::Chat;
        self.emit(ControllerEvent::ViewChanged(View::Chat));

        info!(user = username, %user_type, session_id = %session_id, "chat started");
        Ok(session_id)
    }

    /// Restarts the conversation, keeping identity. Returns `None` when nobody
    /// is logged in.
    pub async fn new_session(&self) -> Option<String> {
        let mut guard = self.inner.lock().await;
        let user_id = guard.user_id.clone()?;
        let session_id = self.start_session(&mut guard, user_id);
        info!(session_id = %session_id, "new session started");
        Some(session_id)
    }

    fn start_session(&self, state: &mut ControllerState, user_id: String) -> String {
        let session_id = format_session_id(&user_id, state.session_counter, self.clock.now());
        state.session_counter += 1;
        state.session_epoch += 1;
        state.messages.clear();
        state.session_id = Some(session_id.clone());
        self.emit(ControllerEvent::SessionStarted {
            session_id: session_id.clone(),
        });
        session_id
    }

    pub async fn logout(&self) {
        let mut guard = self.inner.lock().await;
        let was_logged_in = guard.user_id.take().is_some();
        guard.user_type = UserType::default();
        guard.session_id = None;
        guard.session_counter = 1;
        guard.session_epoch += 1;
        guard.messages.clear();
        guard.view = View::Login;
        self.emit(ControllerEvent::ViewChanged(View::Login));

        if was_logged_in {
            info!("logged out");
        }
    }

    /// Sends one message and folds exactly one assistant entry (reply or
    /// fallback) into history. Invalid input, a missing login or an
    /// outstanding request make this a silent no-op.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message = text.trim();
        let chars = message.chars().count();
        if chars == 0 {
            return SendOutcome::Ignored(IgnoreReason::Empty);
        }
        if chars > MAX_MESSAGE_CHARS {
            return SendOutcome::Ignored(IgnoreReason::TooLong);
        }

        let (request, epoch) = {
            let mut guard = self.inner.lock().await;
            let (Some(user_id), Some(session_id)) =
                (guard.user_id.clone(), guard.session_id.clone())
            else {
                return SendOutcome::Ignored(IgnoreReason::LoggedOut);
            };
            if guard.busy {
                return SendOutcome::Ignored(IgnoreReason::Busy);
            }

            let user_message = ChatMessage::user(message, self.clock.now());
            guard.messages.push(user_message.clone());
            self.emit(ControllerEvent::MessageAppended(user_message));
            guard.busy = true;
            self.emit(ControllerEvent::BusyChanged(true));

            let request = ChatUiRequest {
                message: message.to_string(),
                session_id,
                user_id,
                user_type: guard.user_type,
            };
            (request, guard.session_epoch)
        };

        debug!(session_id = %request.session_id, chars, "sending chat message");
        let result = self.transport.send_chat(&request).await;

        let mut guard = self.inner.lock().await;
        let now = self.clock.now();
        let (reply, outcome) = match result {
            Ok(response) => (ChatMessage::reply(response, now), SendOutcome::Replied),
            Err(err) => {
                warn!(
                    session_id = %request.session_id,
                    error = %err,
                    "chat request failed; substituting fallback reply"
                );
                (ChatMessage::fallback(now), SendOutcome::FellBack)
            }
        };

        if guard.session_epoch == epoch {
            guard.messages.push(reply.clone());
            self.emit(ControllerEvent::MessageAppended(reply));
        } else {
            debug!(
                session_id = %request.session_id,
                "session replaced while request was in flight; dropping reply"
            );
        }

        guard.busy = false;
        self.emit(ControllerEvent::BusyChanged(false));
        outcome
    }

    /// Queries the engine indicator. Never fails; failures become a degraded
    /// display value.
    pub async fn load_engine_status(&self) -> EngineStatus {
        let status = match self.transport.engine_status().await {
            Ok(body) => EngineStatus::Active(body.active_engine),
            Err(err) if err.is_status() => {
                warn!(error = %err, "engine status unavailable");
                EngineStatus::Unknown
            }
            Err(err) => {
                warn!(error = %err, "could not load engine status");
                EngineStatus::Offline
            }
        };

        let mut guard = self.inner.lock().await;
        guard.engine = status.clone();
        self.emit(ControllerEvent::EngineStatusChanged(status.clone()));
        status
    }

    /// Fire-and-forget variant of [`Self::load_engine_status`].
    pub fn spawn_engine_status_query(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.load_engine_status().await;
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
