use thiserror::Error;

/// Errors surfaced by the connection manager and the user stores.
#[derive(Error, Debug)]
pub enum Error {
    /// Session could not be established (unreachable host, bad credentials).
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// Operation attempted before `initialize` or after `close`.
    #[error("database is not connected")]
    NotConnected,

    /// Storage rejected or failed a read/write.
    #[error("storage operation failed: {0}")]
    Persistence(#[source] sqlx::Error),

    #[error("no user with email '{email}'")]
    NotFound { email: String },

    #[error("invalid user: {0}")]
    InvalidUser(String),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Persistence,
    NotFound,
    Invalid,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) | Error::NotConnected => ErrorKind::Connection,
            Error::Persistence(_) | Error::Migration(_) => ErrorKind::Persistence,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidUser(_) => ErrorKind::Invalid,
        }
    }

    /// Classify a driver error raised while running a statement.
    pub(crate) fn from_query(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => Error::NotConnected,
            other => Error::Persistence(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
