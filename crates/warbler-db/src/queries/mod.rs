mod follows;
mod likes;
mod messages;
mod users;

use crate::Result;

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// `COUNT(*)` helper for single-parameter counts.
pub(crate) fn count(conn: &rusqlite::Connection, sql: &str, id: i64) -> Result<usize> {
    let n: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(n as usize)
}
