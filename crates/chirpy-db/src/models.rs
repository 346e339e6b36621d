/// Database row types, mapped directly from SQLite rows.
/// Ids and timestamps stay as stored text; the API layer parses them.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone)]
pub struct ChirpRow {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct RefreshTokenRow {
    pub token: String,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
    pub expires_at: String,
    pub revoked_at: Option<String>,
}

/// Outcome of rewriting a user's email and password hash.
#[derive(Debug, Clone)]
pub enum UserUpdate {
    Updated(UserRow),
    EmailTaken,
    NotFound,
}
