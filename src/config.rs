use std::env;
use std::fmt;
use std::str::FromStr;

/// Whether the service runs with development conveniences enabled.
///
/// Debug mode lowers the log level to `debug`, switches log output to a
/// human-readable format, and exposes the underlying error text in 500
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Debug,
    Release,
}

impl FromStr for AppMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(AppMode::Debug),
            "release" => Ok(AppMode::Release),
            other => Err(ConfigError::Invalid {
                key: "APP_MODE",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub mode: AppMode,
    pub host: String,
    pub port: u16,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    /// Set from `DATABASE_URL`; takes precedence over the individual parts.
    pub url: Option<String>,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.username, self.password, self.host, self.port, self.name
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

impl Config {
    /// Loads `.env` (when present) and reads the configuration from the
    /// process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source, falling
    /// back to defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mode = match lookup("APP_MODE") {
            Some(value) => value.parse()?,
            None => AppMode::Release,
        };
        let host = string("APP_HOST", "127.0.0.1");
        let port = parse_var(&lookup, "APP_PORT", 8080u16)?;
        let url = lookup("APP_URL").unwrap_or_else(|| format!("http://{}:{}", host, port));

        Ok(Self {
            app: AppConfig {
                name: string("APP_NAME", "todo-api"),
                mode,
                host,
                port,
                url,
            },
            database: DatabaseConfig {
                host: string("DB_HOST", "127.0.0.1"),
                port: parse_var(&lookup, "DB_PORT", 5432u16)?,
                username: string("DB_USERNAME", "postgres"),
                password: string("DB_PASSWORD", "postgres"),
                name: string("DB_NAME", "todo_list"),
                max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", 10u32)?,
                url: lookup("DATABASE_URL"),
            },
            jwt: JwtConfig {
                secret: string("JWT_SECRET", "my-secret-key"),
                access_ttl_hours: parse_ttl_hours(&lookup, "JWT_EXP_IN_HOUR", 1)?,
                refresh_ttl_hours: parse_ttl_hours(&lookup, "JWT_REFRESH_EXP_IN_HOUR", 168)?,
            },
        })
    }

    pub fn is_debug(&self) -> bool {
        self.app.mode == AppMode::Debug
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.app.host.clone(), self.app.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Longest token lifetime accepted from the environment (100 years).
pub const MAX_TTL_HOURS: i64 = 876_000;

/// A token lifetime in hours: a whole number in `1..=MAX_TTL_HOURS`.
fn parse_ttl_hours<F>(lookup: &F, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let hours = parse_var(lookup, key, default)?;
    if (1..=MAX_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: hours.to_string(),
        })
    }
}
