pub mod config;
pub mod db;
pub mod error;
pub mod users;

pub use config::DbConfig;
pub use db::Database;
pub use error::{Error, ErrorKind, Result};
pub use users::{MemoryUserStore, PgUserStore, User, UserStore};
