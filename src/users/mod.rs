pub mod repo;
pub mod repo_types;
mod services;
pub mod store;

pub use repo::PgUserStore;
pub use repo_types::{User, UserRow};
pub use store::{MemoryUserStore, UserStore};
