use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

#[derive(Clone)]
pub struct DbConfig {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DbConfig {
    pub fn new(database: &str, user: &str, password: &str, host: &str) -> Self {
        Self {
            database: database.into(),
            user: user.into(),
            password: password.into(),
            host: host.into(),
            port: 5432,
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(
            &std::env::var("DB_NAME").unwrap_or_else(|_| "learning".into()),
            &std::env::var("DB_USER").unwrap_or_else(|_| "postgres".into()),
            &std::env::var("DB_PASSWORD").unwrap_or_else(|_| "admin".into()),
            &std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
        );
        config.port = env_or("DB_PORT", config.port);
        config.min_connections = env_or("DB_MIN_CONNECTIONS", config.min_connections);
        config.max_connections = env_or("DB_MAX_CONNECTIONS", config.max_connections);
        config.acquire_timeout_secs = env_or("DB_ACQUIRE_TIMEOUT_SECS", config.acquire_timeout_secs);
        config
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_pool_defaults() {
        let config = DbConfig::new("learning", "postgres", "admin", "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn parse_or_falls_back_on_missing_or_garbage() {
        assert_eq!(parse_or::<u16>(None, 5432), 5432);
        assert_eq!(parse_or::<u16>(Some("not-a-port"), 5432), 5432);
        assert_eq!(parse_or::<u16>(Some(" 6543 "), 5432), 6543);
    }

    #[test]
    fn debug_hides_password() {
        let config = DbConfig::new("learning", "postgres", "s3cret", "localhost");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("learning"));
    }

    #[test]
    fn connect_options_carry_host_and_database() {
        let config = DbConfig::new("learning", "postgres", "admin", "db.internal");
        let opts = config.connect_options();
        assert_eq!(opts.get_host(), "db.internal");
        assert_eq!(opts.get_port(), 5432);
        assert_eq!(opts.get_database(), Some("learning"));
        assert_eq!(opts.get_username(), "postgres");
    }
}
