//! Text input requested from the user
//!
//! The text tool asks the host for a label string. Hosts typically show a
//! modal input; returning `None` means the user cancelled.

/// Asks the user for a line of text
pub trait TextPrompt {
    fn request_text(&mut self, message: &str) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn request_text(&mut self, message: &str) -> Option<String> {
        self(message)
    }
}

/// Prompt that always cancels, used when no host prompt is installed
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl TextPrompt for NoPrompt {
    fn request_text(&mut self, message: &str) -> Option<String> {
        tracing::warn!(message, "no text prompt installed");
        None
    }
}

/// Prompt that answers from a queue of prepared replies
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: std::collections::VecDeque<Option<String>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply for the next request; `None` cancels it
    pub fn push(&mut self, answer: Option<String>) {
        self.answers.push_back(answer);
    }
}

impl TextPrompt for ScriptedPrompt {
    fn request_text(&mut self, _message: &str) -> Option<String> {
        self.answers.pop_front().flatten()
    }
}
