// --- File: crates/carecard_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
            allowed_origins: Vec::new(),
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite:data/carecard.db, loaded via CARECARD__DATABASE__URL
    #[serde(default)]
    pub max_connections: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/carecard.db".to_string(),
            max_connections: None,
        }
    }
}

// --- Auth Config ---
// Tokens are issued by the external auth service; we only verify them.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AuthConfig {
    /// HS256 secret shared with the auth service. Usually "secret_from_env".
    pub jwt_secret: String,
    #[serde(default)]
    pub audience: Option<String>,
}

// --- Razorpay Config ---
// Key id and enable flag live in the payment_settings table; this section holds
// transport settings and the fallback key secret.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RazorpayConfig {
    #[serde(default = "default_razorpay_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub key_secret: Option<String>,
    #[serde(default)]
    pub verify_signatures: bool,
}

fn default_razorpay_api_base() -> String {
    "https://api.razorpay.com/v1".to_string()
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            api_base: default_razorpay_api_base(),
            key_secret: None,
            verify_signatures: false,
        }
    }
}

// --- Invoice Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceConfig {
    #[serde(default = "default_invoice_prefix")]
    pub prefix: String,
    /// IANA zone used for the date part of invoice numbers.
    #[serde(default = "default_invoice_timezone")]
    pub timezone: String,
}

fn default_invoice_prefix() -> String {
    "INV".to_string()
}

fn default_invoice_timezone() -> String {
    "Asia/Kolkata".to_string()
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            prefix: default_invoice_prefix(),
            timezone: default_invoice_timezone(),
        }
    }
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_razorpay: bool,

    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub razorpay: RazorpayConfig,
    #[serde(default)]
    pub invoice: InvoiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
