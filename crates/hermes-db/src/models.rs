/// Database row types — these map directly to SQLite rows.
/// Distinct from the hermes-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub created_at: String,
}

/// Profile fields owned by the profile endpoints, stored on the user row.
#[derive(Debug, Clone, Copy)]
pub enum ProfileField {
    Bio,
    Nickname,
}

impl ProfileField {
    pub fn column(&self) -> &'static str {
        match self {
            ProfileField::Bio => "bio",
            ProfileField::Nickname => "nickname",
        }
    }
}
