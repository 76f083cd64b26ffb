//! Service configuration

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Secret used to sign identity tokens. Rotating it invalidates
    /// every outstanding token.
    pub signing_secret: String,

    /// Secret used to sign the flash-session cookie.
    pub session_secret: String,

    /// Production mode: secure cookies with SameSite=None.
    pub production: bool,

    /// SQLite database path; None selects the in-memory store.
    pub database_path: Option<String>,

    /// Directory served under /public
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            signing_secret: std::env::var("SIGNING_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.signing_secret),
            session_secret: std::env::var("SESSION_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.session_secret),
            production: std::env::var("APP_ENV").is_ok_and(|v| v == "production"),
            database_path: std::env::var("DATABASE_PATH").ok(),
            static_dir: std::env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5500,
            signing_secret: "dev-signing-secret-change-in-production".to_string(),
            session_secret: "dev-session-secret-change-in-production-64-bytes-minimum-padding!!".to_string(),
            production: false,
            database_path: None,
            static_dir: "public".to_string(),
        }
    }
}
