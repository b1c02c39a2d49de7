use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::users::services::{is_valid_email, normalize_email};

/// A user as the application sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserFields")]
pub struct User {
    email: String,
    first_name: String,
    last_name: String,
    note: Option<String>,
}

impl User {
    pub fn new(
        email: &str,
        first_name: &str,
        last_name: &str,
        note: Option<&str>,
    ) -> Result<Self> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(Error::InvalidUser(format!("malformed email '{}'", email)));
        }
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(Error::InvalidUser("first name is empty".into()));
        }
        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(Error::InvalidUser("last name is empty".into()));
        }
        Ok(Self {
            email,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            note: note.filter(|n| !n.is_empty()).map(str::to_string),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Unvalidated wire form; deserialization goes through `User::new`.
#[derive(Deserialize)]
struct UserFields {
    email: String,
    first_name: String,
    last_name: String,
    #[serde(default)]
    note: Option<String>,
}

impl TryFrom<UserFields> for User {
    type Error = Error;

    fn try_from(f: UserFields) -> Result<Self> {
        User::new(&f.email, &f.first_name, &f.last_name, f.note.as_deref())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<User {}: {} {}", self.email, self.first_name, self.last_name)?;
        if let Some(note) = &self.note {
            write!(f, " ({})", note)?;
        }
        write!(f, ">")
    }
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,                   // row id, assigned on first insert
    pub email: String,              // unique lookup key
    pub first_name: String,
    pub last_name: String,
    pub note: Option<String>,       // NULL when absent
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime, // bumped on every upsert
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            note: r.note,
        }
    }
}
