//! Status message sink
//!
//! The UI exposes a single-line status area; every user-visible state change
//! is reported through a [`StatusSink`].

/// Receives user-facing status messages
pub trait StatusSink {
    fn status(&mut self, message: &str);
}

impl<F> StatusSink for F
where
    F: FnMut(&str),
{
    fn status(&mut self, message: &str) {
        self(message)
    }
}

/// Sink that keeps every message it receives
#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    messages: Vec<String>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in arrival order
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Most recent message
    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    /// Take the collected messages, leaving the log empty
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl StatusSink for StatusLog {
    fn status(&mut self, message: &str) {
        tracing::trace!(message, "status");
        self.messages.push(message.to_owned());
    }
}
