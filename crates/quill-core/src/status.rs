//! Short notices for the status line.

/// Receives user-visible notices such as "End of buffer".
pub trait StatusReporter {
    fn set_status(&mut self, msg: &str);
}

/// Collects notices in order and logs each one.
#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    messages: Vec<String>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent notice.
    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Drains every collected notice.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl StatusReporter for StatusLog {
    fn set_status(&mut self, msg: &str) {
        tracing::info!(target: "quill::status", "{}", msg);
        self.messages.push(msg.to_string());
    }
}
