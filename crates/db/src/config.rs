use std::fmt;

use sqlx::postgres::PgConnectOptions;

/// Default database name.
pub const DEFAULT_DATABASE: &str = "olist_ecommerce";
/// Default database user.
pub const DEFAULT_USER: &str = "postgres";
/// Default database password.
pub const DEFAULT_PASSWORD: &str = "postgres";
/// Default database host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default database port.
pub const DEFAULT_PORT: u16 = 5432;

/// PostgreSQL connection parameters.
///
/// Supplied already validated by the caller; nothing in this crate reads
/// the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionParams {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.into(),
            password: DEFAULT_PASSWORD.into(),
            database: DEFAULT_DATABASE.into(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "postgres://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_development() {
        let params = ConnectionParams::default();
        assert_eq!(params.host, "localhost");
        assert_eq!(params.port, 5432);
        assert_eq!(params.database, "olist_ecommerce");
    }

    #[test]
    fn debug_and_display_hide_password() {
        let params = ConnectionParams {
            password: "hunter2".into(),
            ..ConnectionParams::default()
        };
        assert!(!format!("{params:?}").contains("hunter2"));
        assert_eq!(
            params.to_string(),
            "postgres://postgres@localhost:5432/olist_ecommerce"
        );
    }

    #[test]
    fn connect_options_carry_target() {
        let options = ConnectionParams::default().connect_options();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("olist_ecommerce"));
    }
}
