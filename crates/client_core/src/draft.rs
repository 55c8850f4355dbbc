//! Gauging of the message being composed, backing the send affordance.

/// Longest message, in characters, the chat service accepts.
pub const MAX_MESSAGE_CHARS: usize = 500;

const WARNING_THRESHOLD: usize = 400;
const DANGER_THRESHOLD: usize = 450;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCountLevel {
    Normal,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftGauge {
    pub chars: usize,
    pub can_send: bool,
    pub level: CharCountLevel,
}

impl DraftGauge {
    pub fn measure(draft: &str) -> Self {
        let chars = draft.chars().count();
        let trimmed = draft.trim().chars().count();
        let level = if chars > DANGER_THRESHOLD {
            CharCountLevel::Danger
        } else if chars > WARNING_THRESHOLD {
            CharCountLevel::Warning
        } else {
            CharCountLevel::Normal
        };

        Self {
            chars,
            can_send: trimmed > 0 && trimmed <= MAX_MESSAGE_CHARS,
            level,
        }
    }
}
