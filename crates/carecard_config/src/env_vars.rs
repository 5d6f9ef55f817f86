//! Environment variable handling for CareCard.
//!
//! Configuration values can be overridden with `CARECARD__SECTION__KEY`
//! variables, and secrets are injected from `CARECARD_SECRET_SECTION_KEY`
//! wherever the config file holds the `secret_from_env` marker.

use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "CARECARD";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "CARECARD_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker string replaced by an environment variable at load time.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"server.host"` becomes `"CARECARD__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"razorpay.key_secret"` becomes `"CARECARD_SECRET_RAZORPAY_KEY_SECRET"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to the short form used by most hosting dashboards
///
/// `"razorpay.key_secret"` becomes `"RAZORPAY_KEY_SECRET"`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() < 2 {
        return path.to_uppercase();
    }

    let service = parts[0];
    let key = parts[1..].join(SECRET_SEPARATOR);
    format!("{}_{}", service, key).to_uppercase()
}

/// Get an environment variable for a configuration path
pub fn get_config_env_var(path: &str) -> Option<String> {
    let env_var = config_path_to_env_var(path);
    env::var(&env_var).ok()
}

/// Get an environment variable for a secret path
///
/// Tries the prefixed name first, then the short service form.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    let env_var = secret_path_to_env_var(path);
    if let Ok(value) = env::var(&env_var) {
        return Some(value);
    }

    let legacy_env_var = legacy_secret_path_to_env_var(path);
    env::var(&legacy_env_var).ok()
}

/// Paths containing "secret", "key", "password" or "token" are secrets.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
}

/// Get an environment variable for a path, secret or not.
pub fn get_env_var(path: &str) -> Option<String> {
    if is_secret_path(path) {
        get_secret_env_var(path)
    } else {
        get_config_env_var(path)
    }
}

/// Replace every `secret_from_env` string in `value` from the environment.
///
/// Returns `true` if any value was replaced. Markers without a matching
/// variable are left in place and logged.
pub fn inject_env_vars(value: &mut serde_json::Value) -> bool {
    use serde_json::Value;

    fn walk(path: Vec<String>, obj: &mut Value) -> bool {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    replaced |= walk(new_path, v);
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    let mut new_path = path.clone();
                    new_path.push(i.to_string());
                    replaced |= walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = get_env_var(&path_str) {
                    *s = env_val;
                    replaced = true;
                } else {
                    warn!("env var for {} not found", path_str);
                }
            }
            _ => {}
        }

        replaced
    }

    walk(vec![], value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(
            config_path_to_env_var("server.host"),
            "CARECARD__SERVER__HOST"
        );
        assert_eq!(
            config_path_to_env_var("database.url"),
            "CARECARD__DATABASE__URL"
        );
    }

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("razorpay.key_secret"),
            "CARECARD_SECRET_RAZORPAY_KEY_SECRET"
        );
        assert_eq!(
            secret_path_to_env_var("auth.jwt_secret"),
            "CARECARD_SECRET_AUTH_JWT_SECRET"
        );
    }

    #[test]
    fn test_legacy_secret_path_to_env_var() {
        assert_eq!(
            legacy_secret_path_to_env_var("razorpay.key_secret"),
            "RAZORPAY_KEY_SECRET"
        );
        assert_eq!(legacy_secret_path_to_env_var("standalone"), "STANDALONE");
    }

    #[test]
    fn test_is_secret_path() {
        assert!(is_secret_path("razorpay.key_secret"));
        assert!(is_secret_path("auth.jwt_secret"));
        assert!(is_secret_path("gateway.api_token"));
        assert!(!is_secret_path("server.host"));
        assert!(!is_secret_path("database.url"));
    }

    #[test]
    #[serial]
    fn test_inject_env_vars_replaces_marker() {
        env::set_var("CARECARD_SECRET_AUTH_JWT_SECRET", "from-env");
        let mut value = serde_json::json!({
            "auth": { "jwt_secret": "secret_from_env" },
            "server": { "host": "0.0.0.0" }
        });

        assert!(inject_env_vars(&mut value));
        assert_eq!(value["auth"]["jwt_secret"], "from-env");
        assert_eq!(value["server"]["host"], "0.0.0.0");
        env::remove_var("CARECARD_SECRET_AUTH_JWT_SECRET");
    }

    #[test]
    #[serial]
    fn test_inject_env_vars_reads_plain_path_for_non_secret() {
        env::set_var("CARECARD__DATABASE__URL", "sqlite://from-env.db");
        let mut value = serde_json::json!({
            "database": { "url": "secret_from_env" }
        });

        assert!(inject_env_vars(&mut value));
        assert_eq!(value["database"]["url"], "sqlite://from-env.db");
        env::remove_var("CARECARD__DATABASE__URL");
    }

    #[test]
    #[serial]
    fn test_inject_env_vars_keeps_marker_without_variable() {
        env::remove_var("CARECARD_SECRET_RAZORPAY_KEY_SECRET");
        env::remove_var("RAZORPAY_KEY_SECRET");
        let mut value = serde_json::json!({
            "razorpay": { "key_secret": "secret_from_env" }
        });

        assert!(!inject_env_vars(&mut value));
        assert_eq!(value["razorpay"]["key_secret"], "secret_from_env");
    }
}
