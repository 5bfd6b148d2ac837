//! Process configuration, read once at startup.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;

use eventia_auth::TokenTtls;
use eventia_notify::{ReminderConfig, WhatsAppConfig};
use eventia_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEV_ENVIRONMENTS: [&str; 3] = ["dev", "development", "test"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be set outside development")]
    Missing { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub access_name: String,
    pub refresh_name: String,
    pub secure: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    /// Set when `jwt_secret` is the built-in development value.
    pub dev_secret: bool,
    pub log_format: LogFormat,
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub token_ttls: TokenTtls,
    pub cookies: CookieSettings,
    /// Offset of the companies' local wall clock from UTC.
    pub utc_offset_minutes: i32,
    pub status_sync_interval: Duration,
    pub reminder_interval: Duration,
    pub reminders: ReminderConfig,
    pub whatsapp: WhatsAppConfig,
}

impl AppConfig {
    /// Load from the process environment, after an optional `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL");

        // Without APP_ENV, a configured database means a real deployment.
        let is_dev = match get("APP_ENV") {
            Some(env) => DEV_ENVIRONMENTS.contains(&env.to_ascii_lowercase().as_str()),
            None => database_url.is_none(),
        };
        let (jwt_secret, dev_secret) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if is_dev => (DEV_JWT_SECRET.to_string(), true),
            None => return Err(ConfigError::Missing { key: "JWT_SECRET" }),
        };

        let utc_offset_minutes: i32 = parse(&get, "APP_UTC_OFFSET_MINUTES", 60)?;
        if utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .is_none()
        {
            return Err(ConfigError::Invalid {
                key: "APP_UTC_OFFSET_MINUTES",
                value: utc_offset_minutes.to_string(),
            });
        }

        let reminders = ReminderConfig {
            send_hour: parse(&get, "REMINDER_SEND_HOUR", 9u32)?,
            default_country_code: get("DEFAULT_COUNTRY_CODE").unwrap_or_else(|| "+241".to_string()),
            ..ReminderConfig::default()
        };
        if reminders.send_hour > 23 {
            return Err(ConfigError::Invalid {
                key: "REMINDER_SEND_HOUR",
                value: reminders.send_hour.to_string(),
            });
        }

        Ok(Self {
            jwt_secret,
            dev_secret,
            log_format: parse(&get, "LOG_FORMAT", LogFormat::default())?,
            database_url,
            bind_addr: parse(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            token_ttls: TokenTtls {
                access: positive(&get, "ACCESS_TOKEN_TTL_SECS", 3600)?,
                refresh: positive(&get, "REFRESH_TOKEN_TTL_SECS", 14 * 24 * 3600)?,
            },
            cookies: CookieSettings {
                access_name: get("ACCESS_COOKIE_NAME").unwrap_or_else(|| "access_token".to_string()),
                refresh_name: get("REFRESH_COOKIE_NAME").unwrap_or_else(|| "refresh_token".to_string()),
                secure: parse(&get, "COOKIE_SECURE", false)?,
            },
            utc_offset_minutes,
            status_sync_interval: Duration::from_secs(
                positive(&get, "STATUS_SYNC_INTERVAL_SECS", 60)? as u64,
            ),
            reminder_interval: Duration::from_secs(positive(&get, "REMINDER_INTERVAL_SECS", 3600)? as u64),
            reminders,
            whatsapp: WhatsAppConfig {
                enabled: parse(&get, "WHATSAPP_ENABLED", false)?,
                token: get("WHATSAPP_TOKEN"),
                phone_number_id: get("WHATSAPP_PHONE_NUMBER_ID"),
                api_version: get("WHATSAPP_API_VERSION").unwrap_or_else(|| "v19.0".to_string()),
                base_url: None,
            },
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn positive<G>(get: &G, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = parse(get, key, default)?;
    if value <= 0 {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert!(cfg.dev_secret);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.token_ttls, TokenTtls::default());
        assert_eq!(cfg.cookies.access_name, "access_token");
        assert_eq!(cfg.utc_offset_minutes, 60);
        assert_eq!(cfg.status_sync_interval, Duration::from_secs(60));
        assert_eq!(cfg.reminder_interval, Duration::from_secs(3600));
        assert_eq!(cfg.reminders.send_hour, 9);
        assert_eq!(cfg.reminders.default_country_code, "+241");
        assert!(!cfg.whatsapp.enabled);
        assert_eq!(cfg.whatsapp.api_version, "v19.0");
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let cfg = load(&[
            ("JWT_SECRET", " s3cret "),
            ("LOG_FORMAT", "text"),
            ("DATABASE_URL", "postgres://localhost/eventia"),
            ("ACCESS_TOKEN_TTL_SECS", "900"),
            ("WHATSAPP_ENABLED", "true"),
            ("WHATSAPP_TOKEN", "tok"),
            ("APP_UTC_OFFSET_MINUTES", "-120"),
        ])
        .unwrap();
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert!(!cfg.dev_secret);
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/eventia"));
        assert_eq!(cfg.token_ttls.access, 900);
        assert!(cfg.whatsapp.enabled);
        assert_eq!(cfg.whatsapp.token.as_deref(), Some("tok"));
        assert_eq!(cfg.utc_offset_minutes, -120);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert_eq!(
            load(&[("ACCESS_TOKEN_TTL_SECS", "soon")]).unwrap_err(),
            ConfigError::Invalid {
                key: "ACCESS_TOKEN_TTL_SECS",
                value: "soon".into()
            }
        );
        assert!(load(&[("REFRESH_TOKEN_TTL_SECS", "0")]).is_err());
        assert!(load(&[("REMINDER_SEND_HOUR", "24")]).is_err());
        assert!(load(&[("BIND_ADDR", "localhost")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn utc_offset_must_be_under_a_day() {
        assert_eq!(
            load(&[("APP_UTC_OFFSET_MINUTES", "1440")]).unwrap_err(),
            ConfigError::Invalid {
                key: "APP_UTC_OFFSET_MINUTES",
                value: "1440".into()
            }
        );
        assert!(load(&[("APP_UTC_OFFSET_MINUTES", "-1440")]).is_err());
        assert_eq!(load(&[("APP_UTC_OFFSET_MINUTES", "-600")]).unwrap().utc_offset_minutes, -600);
    }

    #[test]
    fn secret_is_required_with_a_database() {
        assert_eq!(
            load(&[("DATABASE_URL", "postgres://prod/db")]).unwrap_err(),
            ConfigError::Missing { key: "JWT_SECRET" }
        );
        let cfg = load(&[("DATABASE_URL", "postgres://prod/db"), ("JWT_SECRET", "k")]).unwrap();
        assert_eq!(cfg.jwt_secret, "k");
    }

    #[test]
    fn app_env_decides_whether_the_dev_secret_is_allowed() {
        assert_eq!(
            load(&[("APP_ENV", "production")]).unwrap_err(),
            ConfigError::Missing { key: "JWT_SECRET" }
        );
        let cfg = load(&[("APP_ENV", "Dev"), ("DATABASE_URL", "postgres://localhost/eventia")]).unwrap();
        assert!(cfg.dev_secret);
    }
}
