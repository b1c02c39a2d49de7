use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::users::repo_types::{User, UserRow};
use crate::users::services::normalize_email;
use crate::users::store::UserStore;

/// `UserStore` backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    db: Database,
}

impl PgUserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Find the stored row for an email, including row metadata.
    pub(crate) async fn find_row(&self, email: &str) -> Result<Option<UserRow>> {
        let pool = self.db.pool()?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, last_name, note, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&pool)
        .await
        .map_err(Error::from_query)?;
        Ok(row)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, user), fields(email = %user.email()))]
    async fn save(&self, user: &User) -> Result<()> {
        let pool = self.db.pool()?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
               SET first_name = EXCLUDED.first_name,
                   last_name  = EXCLUDED.last_name,
                   note       = EXCLUDED.note,
                   updated_at = now()
            RETURNING id, email, first_name, last_name, note, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.email())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.note()) // Option<&str> → NULL allowed
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            error!(error = %e, "save user failed");
            Error::from_query(e)
        })?;

        info!(user_id = %row.id, created = row.created_at == row.updated_at, "user saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_by_email(&self, email: &str) -> Result<User> {
        match self.find_row(email).await? {
            Some(row) => {
                debug!(user_id = %row.id, "user loaded");
                Ok(row.into())
            }
            None => {
                warn!("user not found");
                Err(Error::NotFound {
                    email: normalize_email(email),
                })
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_by_email(&self, email: &str) -> Result<bool> {
        let pool = self.db.pool()?;
        let res = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .execute(&pool)
            .await
            .map_err(Error::from_query)?;
        Ok(res.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let pool = self.db.pool()?;
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .map_err(Error::from_query)?;
        Ok(n as u64)
    }
}
