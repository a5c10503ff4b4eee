use thiserror::Error;

/// Store-level failures. Business outcomes (`UserNotFound`, `AlreadyFriends`,
/// ...) are surfaced to the caller as-is; `Unavailable` covers anything that
/// means the backing store could not complete the operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("username already exists: {0}")]
    UsernameTaken(String),

    #[error("already friends")]
    AlreadyFriends,

    #[error("cannot add yourself as a friend")]
    SelfFriend,

    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
