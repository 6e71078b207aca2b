use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a timestamp as stored by SQLite.
///
/// `datetime('now')` yields "YYYY-MM-DD HH:MM:SS" without a zone; those are
/// read as UTC. RFC 3339 strings are accepted as well.
pub fn parse_db_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
