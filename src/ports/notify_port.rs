//! Chat notification port trait.

use crate::domain::error::TraderError;

/// Best-effort delivery of a plain-text message. Callers log failures and
/// carry on.
pub trait NotifyPort {
    fn send(&self, message: &str) -> Result<(), TraderError>;
}
