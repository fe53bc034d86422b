//! Notifier that writes messages to the log.

use crate::domain::error::TraderError;
use crate::ports::notify_port::NotifyPort;
use log::info;

/// Used when no chat channel is configured.
pub struct LogNotifier;

impl NotifyPort for LogNotifier {
    fn send(&self, message: &str) -> Result<(), TraderError> {
        for line in message.lines().filter(|l| !l.trim().is_empty()) {
            info!("[notify] {}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_never_fails() {
        assert!(LogNotifier.send("Algo-trading system completed!\n\nTotal trades: 0").is_ok());
        assert!(LogNotifier.send("").is_ok());
    }
}
