//! Line commands for the `ghostchat` terminal client

use crate::session::SessionEvent;
use ghost_common::{AppError, AppResult};
use ghost_core::{DomainError, Handle, Message};

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// `/open <handle>`
    Open(Handle),
    /// `/leave`
    Leave,
    /// `/online`
    Online,
    /// `/quit`
    Quit,
    /// Anything else is message text
    Say(String),
}

impl CliCommand {
    /// Parse a line of input
    pub fn parse(line: &str) -> AppResult<Self> {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Ok(Self::Say(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (command, arg) {
            ("open", Some(handle)) => {
                let handle = Handle::parse(handle).map_err(DomainError::from)?;
                Ok(Self::Open(handle))
            }
            ("open", None) => Err(AppError::invalid_input("usage: /open <handle>")),
            ("leave", None) => Ok(Self::Leave),
            ("online", None) => Ok(Self::Online),
            ("quit" | "exit", None) => Ok(Self::Quit),
            _ => Err(AppError::invalid_input(format!("unknown command /{rest}"))),
        }
    }
}

/// Render a session event as one line of output
#[must_use]
pub fn render_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Connected => "* connected".to_string(),
        SessionEvent::Disconnected => "* disconnected, reconnecting".to_string(),
        SessionEvent::MessageReceived { message } => render_message(message),
        SessionEvent::Notification { message } => {
            format!("* new message from {}: {}", message.sender, message.preview(40))
        }
        SessionEvent::TypingChanged { peer, is_typing: true } => format!("* {peer} is typing"),
        SessionEvent::TypingChanged { peer, is_typing: false } => format!("* {peer} stopped typing"),
        SessionEvent::PresenceChanged { handle, status } => format!("* {handle} is {status}"),
        SessionEvent::PresenceSynced { online } => format!("* {} online", online.len()),
    }
}

/// Render a chat line
#[must_use]
pub fn render_message(message: &Message) -> String {
    let who = if message.is_mine {
        "you".to_string()
    } else {
        message.sender.to_string()
    };
    format!("[{}] {who}: {}", message.timestamp.format("%H:%M"), message.text)
}
