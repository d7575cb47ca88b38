//! Account store trait and `SQLite`-backed implementation.

use async_trait::async_trait;
use docket_core::{Role, Timestamp};
use docket_storage::rusqlite::{self, OptionalExtension, Row};
use docket_storage::{Database, StorageError};

use crate::account::Account;
use crate::error::{AuthError, AuthResult};

/// Storage backend for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUser`] if the username is taken.
    async fn insert(&self, account: Account) -> AuthResult<Account>;

    /// Look up an account by exact username.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get(&self, username: &str) -> AuthResult<Option<Account>>;

    /// Overwrite the mutable fields of an existing account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] if no such account exists.
    async fn update(&self, account: &Account) -> AuthResult<()>;

    /// Remove an account. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    async fn delete(&self, username: &str) -> AuthResult<bool>;

    /// All accounts, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn list(&self) -> AuthResult<Vec<Account>>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT    NOT NULL UNIQUE,
    password_hash TEXT    NOT NULL,
    role          TEXT    NOT NULL,
    branch_id     INTEGER,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);
";

const COLUMNS: &str =
    "id, username, password_hash, role, branch_id, created_at_us, updated_at_us";

/// `SQLite`-backed account store (`users` table).
#[derive(Debug, Clone)]
pub struct SqliteAccountStore {
    db: Database,
}

impl SqliteAccountStore {
    /// Use `db` for accounts, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub async fn open(db: Database) -> AuthResult<Self> {
        db.ensure_schema("users", SCHEMA).await?;
        Ok(Self { db })
    }

    /// Create an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub async fn in_memory() -> AuthResult<Self> {
        Self::open(Database::open_in_memory()?).await
    }
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    let micros: i64 = row.get(idx)?;
    Timestamp::from_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {micros}").into(),
        )
    })
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: Role::new(row.get::<_, String>(3)?),
        branch_id: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn insert(&self, account: Account) -> AuthResult<Account> {
        let username = account.username.clone();
        let row = account.clone();
        let result = self
            .db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users \
                     (username, password_hash, role, branch_id, created_at_us, updated_at_us) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        row.username,
                        row.password_hash,
                        row.role.as_str(),
                        row.branch_id,
                        row.created_at.as_micros(),
                        row.updated_at.as_micros(),
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await;

        match result {
            Ok(id) => Ok(Account { id, ..account }),
            Err(StorageError::Conflict(_)) => Err(AuthError::DuplicateUser(username)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, username: &str) -> AuthResult<Option<Account>> {
        let username = username.to_owned();
        let sql = format!("SELECT {COLUMNS} FROM users WHERE username = ?1");
        Ok(self
            .db
            .call(move |conn| {
                conn.query_row(&sql, [username], account_from_row)
                    .optional()
            })
            .await?)
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let row = account.clone();
        let changed = self
            .db
            .call(move |conn| {
                conn.execute(
                    "UPDATE users SET password_hash = ?1, role = ?2, branch_id = ?3, \
                     updated_at_us = ?4 WHERE username = ?5",
                    rusqlite::params![
                        row.password_hash,
                        row.role.as_str(),
                        row.branch_id,
                        row.updated_at.as_micros(),
                        row.username,
                    ],
                )
            })
            .await?;
        if changed == 0 {
            return Err(AuthError::UserNotFound(account.username.clone()));
        }
        Ok(())
    }

    async fn delete(&self, username: &str) -> AuthResult<bool> {
        let username = username.to_owned();
        let removed = self
            .db
            .call(move |conn| conn.execute("DELETE FROM users WHERE username = ?1", [username]))
            .await?;
        Ok(removed > 0)
    }

    async fn list(&self) -> AuthResult<Vec<Account>> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY username");
        Ok(self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], account_from_row)?;
                rows.collect()
            })
            .await?)
    }
}
