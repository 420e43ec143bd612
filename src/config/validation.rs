//! Settings validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before settings are accepted, including on hot reload

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{Settings, PLACEHOLDER_ADMIN_KEY};

/// A single semantic problem in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is not a valid {expected} URL: {value}")]
    InvalidUrl {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("remote.key_attribute and remote.value_attribute must differ")]
    SameAttributes,

    #[error("realtime.reconnect_base_ms ({base}) exceeds realtime.reconnect_max_ms ({max})")]
    BackoffRange { base: u64, max: u64 },

    #[error("admin.api_key must be changed before enabling the admin API")]
    PlaceholderAdminKey,
}

/// Validate settings semantically.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let remote = &settings.remote;

    check_url(&mut errors, "remote.endpoint", &remote.endpoint, &["http", "https"], "http(s)");

    for (field, value) in [
        ("remote.project_id", &remote.project_id),
        ("remote.database_id", &remote.database_id),
        ("remote.collection_id", &remote.collection_id),
        ("remote.key_attribute", &remote.key_attribute),
        ("remote.value_attribute", &remote.value_attribute),
        ("cache.directory", &settings.cache.directory),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    if !remote.key_attribute.is_empty() && remote.key_attribute == remote.value_attribute {
        errors.push(ValidationError::SameAttributes);
    }
    if remote.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "remote.request_timeout_secs" });
    }

    let realtime = &settings.realtime;
    if realtime.enabled {
        let endpoint = realtime.resolved_endpoint(remote);
        check_url(&mut errors, "realtime.endpoint", &endpoint, &["ws", "wss"], "ws(s)");
        if realtime.heartbeat_secs == 0 {
            errors.push(ValidationError::Zero { field: "realtime.heartbeat_secs" });
        }
        if realtime.reconnect_base_ms > realtime.reconnect_max_ms {
            errors.push(ValidationError::BackoffRange {
                base: realtime.reconnect_base_ms,
                max: realtime.reconnect_max_ms,
            });
        }
    }

    if settings.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &settings.observability.metrics_address);
    }

    if settings.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &settings.admin.bind_address);
        if settings.admin.api_key.is_empty() || settings.admin.api_key == PLACEHOLDER_ADMIN_KEY {
            errors.push(ValidationError::PlaceholderAdminKey);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    schemes: &[&str],
    expected: &'static str,
) {
    let valid = Url::parse(value)
        .map(|url| schemes.contains(&url.scheme()))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            expected,
            value: value.to_string(),
        });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.remote.endpoint = "https://cloud.example.com/v1".to_string();
        settings.remote.project_id = "project".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert_eq!(validate_settings(&valid_settings()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut settings = valid_settings();
        settings.remote.endpoint = "ftp://nope".to_string();
        settings.remote.project_id = String::new();
        settings.remote.value_attribute = "key".to_string();
        settings.remote.request_timeout_secs = 0;
        settings.realtime.enabled = false;

        let errors = validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::SameAttributes));
        assert!(errors.contains(&ValidationError::Empty { field: "remote.project_id" }));
    }

    #[test]
    fn test_realtime_checks_only_when_enabled() {
        let mut settings = valid_settings();
        settings.realtime.endpoint = Some("https://not-a-socket".to_string());
        settings.realtime.reconnect_base_ms = 10_000;
        settings.realtime.reconnect_max_ms = 1_000;
        assert_eq!(validate_settings(&settings).unwrap_err().len(), 2);

        settings.realtime.enabled = false;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_admin_requires_real_key() {
        let mut settings = valid_settings();
        settings.admin.enabled = true;
        assert_eq!(
            validate_settings(&settings).unwrap_err(),
            vec![ValidationError::PlaceholderAdminKey]
        );

        settings.admin.api_key = "s3cret".to_string();
        settings.admin.bind_address = "localhost".to_string();
        let errors = validate_settings(&settings).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidAddress { .. }));
    }
}
