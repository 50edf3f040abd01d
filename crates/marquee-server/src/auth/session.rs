use rusqlite::Connection;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::User;

/// Session credentials issued at login. Both values live on the user record
/// and stay valid until logout blanks them; there is no expiry.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub session_uuid: String,
    pub access_token: String,
}

pub fn issue_session(conn: &Connection, user_id: &str) -> AppResult<SessionCredentials> {
    let session_uuid = Uuid::new_v4().to_string();
    let access_token = generate_token();

    conn.execute(
        "UPDATE users SET is_logged_in = 1, uuid = ?1, access_token = ?2 WHERE id = ?3",
        rusqlite::params![session_uuid, access_token, user_id],
    )?;

    Ok(SessionCredentials {
        session_uuid,
        access_token,
    })
}

/// Clear the login flag and both identifiers for the user holding this
/// session uuid. Returns false when no user holds it.
pub fn revoke_session(conn: &Connection, session_uuid: &str) -> AppResult<bool> {
    if session_uuid.is_empty() {
        return Ok(false);
    }
    let affected = conn.execute(
        "UPDATE users SET is_logged_in = 0, uuid = '', access_token = '' WHERE uuid = ?1",
        rusqlite::params![session_uuid],
    )?;
    Ok(affected > 0)
}

/// Look up the user holding this access token. Logged-out users keep an
/// empty token column, so an empty bearer value never matches.
pub fn resolve_token(conn: &Connection, token: &str) -> AppResult<Option<User>> {
    if token.is_empty() {
        return Ok(None);
    }
    let result = conn.query_row(
        &format!(
            "SELECT {} FROM users WHERE access_token = ?1",
            User::COLUMNS
        ),
        rusqlite::params![token],
        User::from_row,
    );
    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn generate_token() -> String {
    use base64::Engine;
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_distinct_and_opaque() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        // 32 bytes of entropy, URL-safe base64 without padding
        assert_eq!(a.len(), 43);
        assert!(!a.contains('='));
    }
}
