/// All resolved instants are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Signed distance between two instants, in milliseconds.
pub type Millis = i64;

/// Display color as a `#rrggbb` hex string.
pub type HexColor = &'static str;
