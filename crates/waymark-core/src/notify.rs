//! Session outcome notifications

use std::sync::Mutex;
use tracing::info;

/// Delivers short user-facing messages about session outcomes.
///
/// The recorder announces resumes, recorded point counts, and empty-session
/// cleanup through this seam; what "delivering" means is up to the host.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that writes messages to the log
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        info!(target: "waymark::notify", "{message}");
    }
}

/// Notifier that records messages for assertions in tests
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify("first");
        notifier.notify("second");

        assert_eq!(notifier.messages(), vec!["first", "second"]);
        assert_eq!(notifier.last().unwrap(), "second");
    }
}
