use std::env;

/// Config holds all application configuration.
/// Built once at startup and shared read-only through AppState.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub product_name: String,
    pub environment: String,
    pub listen_addr: String,
    pub db_path: String,
    pub db_max_connections: u32,
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
    pub session_ttl_hours: i64,
    pub admin_password: String,
    pub bcrypt_cost: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "NetNova Billing + EVIL MARIA".to_string(),
            product_name: "NetNova".to_string(),
            environment: "development".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            db_path: "./netnova.db".to_string(),
            db_max_connections: 5,
            allowed_origins: vec!["*".to_string()],
            static_dir: "./static".to_string(),
            session_ttl_hours: 24,
            admin_password: "admin123".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            app_name: get("APP_NAME", &defaults.app_name),
            product_name: get("PRODUCT_NAME", &defaults.product_name),
            environment: get("ENVIRONMENT", &defaults.environment),
            listen_addr: get("LISTEN_ADDR", &defaults.listen_addr),
            db_path: get("DB_PATH", &defaults.db_path),
            db_max_connections: get("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(defaults.db_max_connections),
            allowed_origins: parse_origins(&get("ALLOWED_ORIGINS", "*")),
            static_dir: get("STATIC_DIR", &defaults.static_dir),
            session_ttl_hours: get("SESSION_TTL_HOURS", "24")
                .parse()
                .unwrap_or(defaults.session_ttl_hours),
            admin_password: get("ADMIN_PASSWORD", &defaults.admin_password),
            bcrypt_cost: lookup("BCRYPT_COST")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bcrypt_cost),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() { vec!["*".to_string()] } else { origins }
}
