use crate::Database;
use crate::error::StoreError;
use crate::models::{MessageRow, ProfileField, UserRow};
use rusqlite::Connection;

impl Database {
    // -- Users --

    /// Check-then-insert under the single connection lock, so a concurrent
    /// registration of the same name cannot slip between the two.
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            if query_user_by_username(conn, username)?.is_some() {
                return Err(StoreError::UsernameTaken(username.to_string()));
            }
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Friendships --

    /// Insert both directed rows in one transaction: the relation is applied
    /// to both sides or neither, even under concurrent calls for the same pair.
    pub fn add_friendship(&self, username: &str, friend: &str) -> Result<(), StoreError> {
        if username == friend {
            return Err(StoreError::SelfFriend);
        }

        self.with_conn_mut(|conn| {
            let user_id = require_user_id(conn, username)?;
            let friend_id = require_user_id(conn, friend)?;

            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM friendships WHERE user_id = ?1 AND friend_id = ?2",
                    (&user_id, &friend_id),
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(StoreError::AlreadyFriends);
            }

            tx.execute(
                "INSERT INTO friendships (user_id, friend_id) VALUES (?1, ?2)",
                (&user_id, &friend_id),
            )?;
            tx.execute(
                "INSERT INTO friendships (user_id, friend_id) VALUES (?1, ?2)",
                (&friend_id, &user_id),
            )?;

            tx.commit()?;
            Ok(())
        })
    }

    pub fn friends_of(&self, username: &str) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| {
            let user_id = require_user_id(conn, username)?;

            let mut stmt = conn.prepare(
                "SELECT u.username FROM friendships f
                 JOIN users u ON u.id = f.friend_id
                 WHERE f.user_id = ?1",
            )?;
            let rows = stmt
                .query_map([&user_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;

            Ok(rows)
        })
    }

    /// The authorization predicate: true iff `receiver` is in `sender`'s
    /// friend set. A nonexistent sender is an error; a nonexistent receiver
    /// is simply "not a friend".
    pub fn is_friend_of(&self, sender: &str, receiver: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let sender_id = require_user_id(conn, sender)?;

            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM friendships f
                     JOIN users u ON u.id = f.friend_id
                     WHERE f.user_id = ?1 AND u.username = ?2",
                    (&sender_id, receiver),
                    |row| row.get(0),
                )
                .optional()?;

            Ok(found.is_some())
        })
    }

    // -- Messages --

    /// Append-only; no identity validation here, that is the delivery
    /// coordinator's responsibility.
    pub fn append_message(
        &self,
        id: &str,
        sender: &str,
        receiver: &str,
        content: &str,
        created_at: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender, receiver, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, sender, receiver, content, created_at),
            )?;
            Ok(())
        })
    }

    /// All messages between the two users in either direction, ascending by
    /// timestamp; ties resolve to insertion order via rowid.
    pub fn conversation(&self, user1: &str, user2: &str) -> Result<Vec<MessageRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender, receiver, content, created_at FROM messages
                 WHERE (sender = ?1 AND receiver = ?2)
                    OR (sender = ?2 AND receiver = ?1)
                 ORDER BY created_at ASC, rowid ASC",
            )?;

            let rows = stmt
                .query_map((user1, user2), |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        sender: row.get(1)?,
                        receiver: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Profile fields --

    pub fn profile_field(
        &self,
        username: &str,
        field: ProfileField,
    ) -> Result<String, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE username = ?1",
                field.column()
            );
            let value: Option<Option<String>> = conn
                .query_row(&sql, [username], |row| row.get(0))
                .optional()?;

            match value {
                Some(v) => Ok(v.unwrap_or_default()),
                None => Err(StoreError::UserNotFound(username.to_string())),
            }
        })
    }

    pub fn set_profile_field(
        &self,
        username: &str,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "UPDATE users SET {} = ?1 WHERE username = ?2",
                field.column()
            );
            let changed = conn.execute(&sql, (value, username))?;
            if changed == 0 {
                return Err(StoreError::UserNotFound(username.to_string()));
            }
            Ok(())
        })
    }
}

fn query_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<UserRow>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn require_user_id(conn: &Connection, username: &str) -> Result<String, StoreError> {
    conn.query_row(
        "SELECT id FROM users WHERE username = ?1",
        [username],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StoreError::UserNotFound(username.to_string()))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
