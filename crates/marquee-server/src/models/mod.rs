use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parse a JSON-encoded text column into its array type.
fn json_col<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// A per-user discount record keyed by a numeric code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    #[serde(rename = "discountValue")]
    pub discount_value: i64,
}

/// One entry in a user's booking list. Owned by exactly one user and only
/// ever persisted as part of that user's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub reference_number: i64,
    pub show_id: i64,
    pub coupon_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_price: Option<i64>,
    pub tickets: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub userid: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub contact: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    /// Session identifier, empty while logged out.
    pub uuid: String,
    /// Bearer credential, empty while logged out.
    #[serde(rename = "accesstoken")]
    pub access_token: String,
    #[serde(rename = "coupens")]
    pub coupons: Vec<Coupon>,
    #[serde(rename = "bookingRequests")]
    pub booking_requests: Vec<BookingRequest>,
    pub created_at: String,
}

impl User {
    pub const COLUMNS: &'static str = "id, userid, email, first_name, last_name, username, contact, password_hash, role, is_logged_in, uuid, access_token, coupons, booking_requests, created_at";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            userid: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            username: row.get(5)?,
            contact: row.get(6)?,
            password_hash: row.get(7)?,
            role: row.get(8)?,
            is_logged_in: row.get(9)?,
            uuid: row.get(10)?,
            access_token: row.get(11)?,
            coupons: json_col(row, 12)?,
            booking_requests: json_col(row, 13)?,
            created_at: row.get(14)?,
        })
    }
}

/// Profile shape returned by login, /auth/me and /auth/session. The `id`
/// field carries the session identifier, not the storage id.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.uuid.clone(),
            username: u.username.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            is_logged_in: u.is_logged_in,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Movie {
    pub id: String,
    pub movieid: i64,
    pub title: String,
    pub published: bool,
    pub released: bool,
    pub poster_url: String,
    pub release_date: String,
    pub publish_date: String,
    pub artists: Vec<serde_json::Value>,
    pub genres: Vec<String>,
    pub duration: i64,
    pub critic_rating: f64,
    pub trailer_url: String,
    pub wiki_url: String,
    pub story_line: String,
    pub shows: Vec<serde_json::Value>,
}

impl Movie {
    pub const COLUMNS: &'static str = "id, movieid, title, published, released, poster_url, release_date, publish_date, artists, genres, duration, critic_rating, trailer_url, wiki_url, story_line, shows";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Movie {
            id: row.get(0)?,
            movieid: row.get(1)?,
            title: row.get(2)?,
            published: row.get(3)?,
            released: row.get(4)?,
            poster_url: row.get(5)?,
            release_date: row.get(6)?,
            publish_date: row.get(7)?,
            artists: json_col(row, 8)?,
            genres: json_col(row, 9)?,
            duration: row.get(10)?,
            critic_rating: row.get(11)?,
            trailer_url: row.get(12)?,
            wiki_url: row.get(13)?,
            story_line: row.get(14)?,
            shows: json_col(row, 15)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Artist {
    pub id: String,
    pub artistid: i64,
    pub first_name: String,
    pub last_name: String,
    pub wiki_url: String,
    pub profile_url: String,
    pub movies: Vec<serde_json::Value>,
}

impl Artist {
    pub const COLUMNS: &'static str =
        "id, artistid, first_name, last_name, wiki_url, profile_url, movies";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Artist {
            id: row.get(0)?,
            artistid: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            wiki_url: row.get(4)?,
            profile_url: row.get(5)?,
            movies: json_col(row, 6)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Genre {
    pub id: String,
    pub genreid: i64,
    pub genre: String,
}

impl Genre {
    pub const COLUMNS: &'static str = "id, genreid, genre";

    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Genre {
            id: row.get(0)?,
            genreid: row.get(1)?,
            genre: row.get(2)?,
        })
    }
}
