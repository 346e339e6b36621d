use chrono::Duration;
use rand::RngCore;

/// Lifetime of a refresh token from the moment it is issued.
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(60);

/// Generate an opaque refresh token: 32 bytes from the thread CSPRNG, hex encoded.
pub fn make_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
