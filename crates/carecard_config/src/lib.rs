pub mod env_vars;
pub mod models;

pub use config::ConfigError;
pub use models::*;

use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// 1. `config/default.*`
/// 2. `config/{RUN_ENV}.*` (RUN_ENV defaults to `debug`)
/// 3. `CARECARD__SECTION__KEY` environment variables
///
/// `secret_from_env` markers are then replaced from the environment.
/// The config directory can be moved with `CARECARD_CONFIG_DIR`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let config_dir = env::var("CARECARD_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));
    load_config_from(&config_dir)
}

/// Loads the configuration from an explicit directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .prefix_separator(env_vars::CONFIG_SEPARATOR)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let mut raw: serde_json::Value = builder.build()?.try_deserialize()?;
    env_vars::inject_env_vars(&mut raw);

    serde_json::from_value(raw)
        .map_err(|err| ConfigError::Message(format!("invalid configuration: {err}")))
}

static INIT_DOTENV: OnceCell<String> = OnceCell::new();

/// Loads the dotenv file once per process and returns its path.
///
/// `DOTENV_OVERRIDE` picks a different file; otherwise `.env` is used.
/// A missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    INIT_DOTENV
        .get_or_init(|| {
            let dotenv_path =
                env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());
            dotenv::from_filename(&dotenv_path).ok();
            dotenv_path
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn temp_config_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("carecard-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    #[serial]
    fn test_load_config_from_default_file() {
        let dir = temp_config_dir("default");
        fs::write(
            dir.join("default.toml"),
            r#"
use_razorpay = true

[server]
host = "0.0.0.0"
port = 9000

[database]
url = "sqlite::memory:"

[auth]
jwt_secret = "plain"
"#,
        )
        .unwrap();

        let config = load_config_from(&dir).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(config.use_razorpay);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.auth.jwt_secret, "plain");
        assert_eq!(config.razorpay.api_base, "https://api.razorpay.com/v1");
        assert_eq!(config.invoice.prefix, "INV");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_env_overrides_and_secret_marker() {
        let dir = temp_config_dir("env");
        fs::write(
            dir.join("default.toml"),
            r#"
[server]
host = "127.0.0.1"
port = 8086

[auth]
jwt_secret = "secret_from_env"
"#,
        )
        .unwrap();
        env::set_var("CARECARD__SERVER__PORT", "9443");
        env::set_var("CARECARD_SECRET_AUTH_JWT_SECRET", "injected");

        let config = load_config_from(&dir).unwrap();
        assert_eq!(config.server.port, 9443);
        assert_eq!(config.auth.jwt_secret, "injected");

        env::remove_var("CARECARD__SERVER__PORT");
        env::remove_var("CARECARD_SECRET_AUTH_JWT_SECRET");
    }
}
