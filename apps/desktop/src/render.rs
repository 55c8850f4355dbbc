//! Turns controller events into transcript lines.

use client_core::{ChatMessage, ControllerEvent, MessageSender, View};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

pub fn render_message(message: &ChatMessage) -> String {
    let label = match (message.sender, message.is_error) {
        (MessageSender::User, _) => "you",
        (MessageSender::Assistant, false) => "assistant",
        (MessageSender::Assistant, true) => "assistant !",
    };
    format!("[{label}] {}\n    {}", message.content, message.info())
}

pub fn render_event(event: &ControllerEvent) -> Option<String> {
    match event {
        ControllerEvent::ViewChanged(View::Login) => Some("Signed out.".to_string()),
        ControllerEvent::ViewChanged(View::Chat) => None,
        ControllerEvent::SessionStarted { session_id } => Some(format!("Session: {session_id}")),
        ControllerEvent::MessageAppended(message) => Some(render_message(message)),
        ControllerEvent::BusyChanged(true) => Some("…".to_string()),
        ControllerEvent::BusyChanged(false) => None,
        ControllerEvent::EngineStatusChanged(status) => Some(status.to_string()),
    }
}

pub async fn print_events(mut events: broadcast::Receiver<ControllerEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(text) = render_event(&event) {
                    println!("{text}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "transcript renderer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
