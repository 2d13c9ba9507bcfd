//! Read-side queries against a finished pack.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};

use crate::bidi::{Direction, EntryRow, LanguagePair};
use crate::error::{PackError, Result};

/// Opens an existing pack read-only.
pub fn open_pack(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PackError::SourceNotFound(format!("pack database {}", path.display())));
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(PackError::Query)
}

/// Case-insensitive lemma lookup in one direction.
///
/// With `pair`, rows are also filtered by the languages stored for that
/// direction. `LOWER` folds ASCII only.
pub fn lookup(
    conn: &Connection,
    lemma: &str,
    direction: Direction,
    pair: Option<&LanguagePair>,
) -> Result<Vec<EntryRow>> {
    query_lemma(conn, lemma, direction, pair).map_err(PackError::Query)
}

fn query_lemma(
    conn: &Connection,
    lemma: &str,
    direction: Direction,
    pair: Option<&LanguagePair>,
) -> rusqlite::Result<Vec<EntryRow>> {
    let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<EntryRow> {
        Ok(EntryRow::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    };
    let rows = match pair {
        None => {
            let mut stmt = conn.prepare_cached(
                "SELECT lemma, definition FROM dictionary_entries \
                 WHERE LOWER(lemma) = LOWER(?1) AND direction = ?2 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![lemma, direction.as_str()], map)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
        Some(pair) => {
            let (source_language, target_language) = pair.languages_for(direction);
            let mut stmt = conn.prepare_cached(
                "SELECT lemma, definition FROM dictionary_entries \
                 WHERE LOWER(lemma) = LOWER(?1) AND direction = ?2 \
                 AND source_language = ?3 AND target_language = ?4 ORDER BY id",
            )?;
            let rows = stmt.query_map(
                params![lemma, direction.as_str(), source_language, target_language],
                map,
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        }
    };
    Ok(rows)
}

/// Row counts per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionCounts {
    pub forward: u64,
    pub reverse: u64,
}

impl DirectionCounts {
    pub fn total(&self) -> u64 {
        self.forward + self.reverse
    }
}

pub fn count_by_direction(conn: &Connection) -> Result<DirectionCounts> {
    query_counts(conn).map_err(PackError::Query)
}

fn query_counts(conn: &Connection) -> rusqlite::Result<DirectionCounts> {
    let mut stmt =
        conn.prepare("SELECT direction, COUNT(*) FROM dictionary_entries GROUP BY direction")?;
    let mut rows = stmt.query([])?;
    let mut counts = DirectionCounts::default();
    while let Some(row) = rows.next()? {
        let direction: String = row.get(0)?;
        let count: i64 = row.get(1)?;
        match direction.as_str() {
            "forward" => counts.forward = count as u64,
            "reverse" => counts.reverse = count as u64,
            _ => {}
        }
    }
    Ok(counts)
}

/// All `pack_metadata` rows.
pub fn read_metadata(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT key, value FROM pack_metadata")
        .map_err(PackError::Query)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(PackError::Query)?;
    rows.collect::<rusqlite::Result<HashMap<_, _>>>()
        .map_err(PackError::Query)
}
