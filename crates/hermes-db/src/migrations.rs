use crate::StoreError;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            bio         TEXT,
            nickname    TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Symmetric relation stored as two directed rows, always written
        -- inside one transaction. The PK rules out duplicates, the CHECK
        -- rules out self-friendship.
        CREATE TABLE IF NOT EXISTS friendships (
            user_id     TEXT NOT NULL REFERENCES users(id),
            friend_id   TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, friend_id),
            CHECK (user_id <> friend_id)
        );

        -- sender/receiver are usernames with no FK on purpose: the store
        -- does not validate identities, the delivery coordinator does.
        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            sender      TEXT NOT NULL,
            receiver    TEXT NOT NULL,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_pair
            ON messages(sender, receiver, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
