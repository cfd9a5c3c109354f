//! Process settings read from environment variables.
//!
//! Both binaries call `dotenvy::dotenv()` first, so a local `.env` file works too.

use crate::{
    config::database::DEFAULT_DATABASE_URL,
    errors::{Error, Result},
};
use std::path::PathBuf;

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::Config {
            message: format!("{key} must be set"),
        })
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::Config {
        message: format!("{key} must be a number, got '{value}'"),
    })
}

/// Discord credentials for posting to the notification channel.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub bot_token: String,
    pub channel_id: u64,
}

/// Settings of the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub seed_file: PathBuf,
    /// Bootstrap admin `(username, password)`
    pub admin: Option<(String, String)>,
    /// Payment notifications are only logged when absent
    pub chat: Option<ChatSettings>,
}

/// Reads a variable, treating blank values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl ServerSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(user), Some(password)) => Some((user, password)),
            (None, None) => None,
            _ => {
                return Err(Error::Config {
                    message: "ADMIN_USERNAME and ADMIN_PASSWORD must be set together".to_string(),
                });
            }
        };

        let chat = match (lookup("DISCORD_BOT_TOKEN"), lookup("NOTIFY_CHANNEL_ID")) {
            (Some(bot_token), Some(channel)) => Some(ChatSettings {
                bot_token,
                channel_id: parse_number("NOTIFY_CHANNEL_ID", &channel)?,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            upload_dir: lookup("UPLOAD_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            seed_file: lookup("SEED_FILE").map_or_else(|| PathBuf::from("config.toml"), PathBuf::from),
            admin,
            chat,
        })
    }
}

/// Settings of the notification bot.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub chat: ChatSettings,
    /// The only user allowed to run bot commands
    pub operator_id: u64,
    pub api_base_url: String,
    pub username: String,
    pub password: String,
    pub notify_window_minutes: i64,
}

impl BotSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let channel = required(&lookup, "NOTIFY_CHANNEL_ID")?;
        let operator = required(&lookup, "OPERATOR_ID")?;
        let notify_window_minutes = match lookup("NOTIFY_WINDOW_MINUTES") {
            Some(value) => parse_number("NOTIFY_WINDOW_MINUTES", &value)?,
            None => 60,
        };
        if notify_window_minutes <= 0 {
            return Err(Error::Config {
                message: "NOTIFY_WINDOW_MINUTES must be positive".to_string(),
            });
        }

        Ok(Self {
            chat: ChatSettings {
                bot_token: required(&lookup, "DISCORD_BOT_TOKEN")?,
                channel_id: parse_number("NOTIFY_CHANNEL_ID", &channel)?,
            },
            operator_id: parse_number("OPERATOR_ID", &operator)?,
            api_base_url: required(&lookup, "API_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            username: required(&lookup, "BOT_USERNAME")?,
            password: required(&lookup, "BOT_PASSWORD")?,
            notify_window_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_server_defaults() -> Result<()> {
        let settings = ServerSettings::from_lookup(vars(&[("JWT_SECRET", "s3cret")]))?;
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind_addr, "0.0.0.0:8080");
        assert_eq!(settings.upload_dir, PathBuf::from("uploads"));
        assert!(settings.admin.is_none());
        assert!(settings.chat.is_none());
        Ok(())
    }

    #[test]
    fn test_server_requires_secret() {
        let err = ServerSettings::from_lookup(vars(&[])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let err = ServerSettings::from_lookup(vars(&[
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_USERNAME", "root"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_bot_settings() -> Result<()> {
        let base = [
            ("DISCORD_BOT_TOKEN", "token"),
            ("NOTIFY_CHANNEL_ID", "42"),
            ("OPERATOR_ID", "7"),
            ("API_BASE_URL", "http://localhost:8080/"),
            ("BOT_USERNAME", "bot"),
            ("BOT_PASSWORD", "password1"),
        ];
        let settings = BotSettings::from_lookup(vars(&base))?;
        assert_eq!(settings.chat.channel_id, 42);
        assert_eq!(settings.operator_id, 7);
        assert_eq!(settings.api_base_url, "http://localhost:8080");
        assert_eq!(settings.notify_window_minutes, 60);

        let mut bad = base.to_vec();
        bad.push(("NOTIFY_WINDOW_MINUTES", "soon"));
        assert!(BotSettings::from_lookup(vars(&bad)).is_err());

        let err = BotSettings::from_lookup(vars(&base[1..])).unwrap_err();
        assert!(err.to_string().contains("DISCORD_BOT_TOKEN"));
        Ok(())
    }
}
