//! Telegram chat notifications.
//!
//! Credentials are resolved once at startup into [`TelegramSettings`]; the
//! environment variables `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID` take
//! precedence over the `[notify]` section of the config file. The shorter
//! `TELEGRAM_TOKEN` / `CHAT_ID` names are read when the long ones are unset.

use crate::ports::config_port::ConfigPort;

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";
pub const LEGACY_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const LEGACY_CHAT_ID_ENV: &str = "CHAT_ID";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramSettings {
    /// `env` is the variable lookup, normally `|k| std::env::var(k).ok()`.
    pub fn resolve<F>(config: &dyn ConfigPort, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |v: Option<String>| {
            v.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        let pick = |vars: [&str; 2], key: &str| {
            vars.into_iter()
                .find_map(|var| non_blank(env(var)))
                .or_else(|| non_blank(config.get_string("notify", key)))
        };
        TelegramSettings {
            bot_token: pick([TOKEN_ENV, LEGACY_TOKEN_ENV], "telegram_bot_token"),
            chat_id: pick([CHAT_ID_ENV, LEGACY_CHAT_ID_ENV], "telegram_chat_id"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[cfg(feature = "telegram")]
pub use client::TelegramNotifier;

#[cfg(feature = "telegram")]
mod client {
    use super::TelegramSettings;
    use crate::domain::error::TraderError;
    use crate::ports::notify_port::NotifyPort;
    use log::{debug, warn};
    use std::time::Duration;

    const API_BASE: &str = "https://api.telegram.org";

    pub struct TelegramNotifier {
        settings: TelegramSettings,
        client: reqwest::blocking::Client,
    }

    impl TelegramNotifier {
        pub fn new(settings: TelegramSettings) -> Result<Self, TraderError> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .map_err(|e| TraderError::Notify {
                    reason: format!("failed to build HTTP client: {}", e),
                })?;
            Ok(Self { settings, client })
        }

        pub(crate) fn send_url(token: &str) -> String {
            format!("{}/bot{}/sendMessage", API_BASE, token)
        }
    }

    impl NotifyPort for TelegramNotifier {
        fn send(&self, message: &str) -> Result<(), TraderError> {
            let (Some(token), Some(chat_id)) =
                (self.settings.bot_token.as_deref(), self.settings.chat_id.as_deref())
            else {
                warn!("Telegram bot token or chat ID not set. Skipping Telegram notification.");
                return Ok(());
            };

            let params = [("chat_id", chat_id), ("text", message), ("parse_mode", "HTML")];
            self.client
                .post(Self::send_url(token))
                .form(&params)
                .send()
                .and_then(|resp| resp.error_for_status())
                .map_err(|e| TraderError::Notify {
                    reason: e.without_url().to_string(),
                })?;
            debug!("Telegram message sent successfully");
            Ok(())
        }
    }

}
