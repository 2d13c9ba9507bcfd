//! Word/definition sources feeding the converter.
//!
//! - [`StarDictReader`]: a parsed StarDict triad
//! - [`SqliteTableSource`]: an older pack with a `dict(lemma, def)` or
//!   `word(w, m)` table

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::{params, Connection, OpenFlags};

use crate::error::{PackError, Result};
use crate::stardict::StarDictReader;

/// One record from a source, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRecord {
    Entry { word: String, definition: String },
    /// The record exists but its definition could not be read or decoded.
    Unreadable { word: String, reason: String },
}

/// A sequence of `(word, definition)` records.
///
/// Items are `Err` only for failures that make the rest of the source
/// unusable; per-record problems are [`SourceRecord::Unreadable`].
pub trait EntrySource {
    /// Provenance tag stored as `converted_from` in the pack metadata.
    fn provenance(&self) -> &'static str;

    /// Human-readable source name, e.g. the StarDict `bookname`.
    fn description(&self) -> Option<String> {
        None
    }

    /// Expected number of records, for progress logging.
    fn len_hint(&self) -> Option<u64> {
        None
    }

    /// `true` when the source declares HTML-annotated definitions.
    fn declares_html(&self) -> bool {
        false
    }

    /// Records dropped before iteration (e.g. undecodable index words).
    fn undecodable_words(&self) -> u64 {
        0
    }

    /// `true` when the source ended inside a record.
    fn truncated(&self) -> bool {
        false
    }

    fn records(&mut self) -> Box<dyn Iterator<Item = Result<SourceRecord>> + '_>;
}

impl EntrySource for StarDictReader {
    fn provenance(&self) -> &'static str {
        "stardict"
    }

    fn description(&self) -> Option<String> {
        self.info.bookname().map(str::to_string)
    }

    fn len_hint(&self) -> Option<u64> {
        Some(self.num_entries() as u64)
    }

    fn declares_html(&self) -> bool {
        self.info.declares_html()
    }

    fn undecodable_words(&self) -> u64 {
        StarDictReader::undecodable_words(self)
    }

    fn truncated(&self) -> bool {
        self.index_truncated()
    }

    fn records(&mut self) -> Box<dyn Iterator<Item = Result<SourceRecord>> + '_> {
        Box::new(self.iter_definitions().map(|(entry, definition)| {
            Ok(match definition {
                Ok(definition) => SourceRecord::Entry {
                    word: entry.word.clone(),
                    definition,
                },
                Err(e) => SourceRecord::Unreadable {
                    word: entry.word.clone(),
                    reason: e.to_string(),
                },
            })
        }))
    }
}

/// Rows fetched per query when streaming a SQLite source.
const SOURCE_PAGE_SIZE: i64 = 1000;

/// Known layouts of pre-existing dictionary databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTable {
    /// `dict(lemma, def)`
    Dict,
    /// `word(w, m)`, the layout produced by StarDict-to-SQLite converters.
    Word,
}

impl SourceTable {
    fn table(&self) -> &'static str {
        match self {
            SourceTable::Dict => "dict",
            SourceTable::Word => "word",
        }
    }

    fn columns(&self) -> (&'static str, &'static str) {
        match self {
            SourceTable::Dict => ("lemma", "def"),
            SourceTable::Word => ("w", "m"),
        }
    }

    fn provenance(&self) -> &'static str {
        match self {
            SourceTable::Dict => "sqlite-dict",
            SourceTable::Word => "sqlite-word",
        }
    }
}

/// Streams `(word, definition)` rows from an existing SQLite dictionary.
pub struct SqliteTableSource {
    conn: Connection,
    path: PathBuf,
    table: SourceTable,
    row_count: u64,
}

impl SqliteTableSource {
    /// Opens `path` read-only and picks the `dict` table, else `word`.
    ///
    /// # Errors
    /// [`PackError::SourceNotFound`] if the file or both tables are missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PackError::SourceNotFound(format!("SQLite source {}", path.display())));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(PackError::SourceDatabase)?;

        let tables = table_names(&conn).map_err(PackError::SourceDatabase)?;
        debug!("Source tables in {}: {:?}", path.display(), tables);

        let table = [SourceTable::Dict, SourceTable::Word]
            .into_iter()
            .find(|t| tables.iter().any(|name| name == t.table()))
            .ok_or_else(|| {
                let message = format!("no 'dict' or 'word' table in {}", path.display());
                PackError::SourceNotFound(message)
            })?;

        let (word_col, def_col) = table.columns();
        let row_count: i64 = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {} IS NOT NULL AND {} IS NOT NULL",
                    table.table(),
                    word_col,
                    def_col
                ),
                [],
                |row| row.get(0),
            )
            .map_err(PackError::SourceDatabase)?;

        info!(
            "Opened SQLite source {} (table '{}', {} rows)",
            path.display(),
            table.table(),
            row_count
        );
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            table,
            row_count: row_count.max(0) as u64,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> SourceTable {
        self.table
    }
}

fn table_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    names.collect()
}

impl EntrySource for SqliteTableSource {
    fn provenance(&self) -> &'static str {
        self.table.provenance()
    }

    fn description(&self) -> Option<String> {
        self.path.file_stem().map(|s| s.to_string_lossy().into_owned())
    }

    fn len_hint(&self) -> Option<u64> {
        Some(self.row_count)
    }

    fn records(&mut self) -> Box<dyn Iterator<Item = Result<SourceRecord>> + '_> {
        let (word_col, def_col) = self.table.columns();
        let sql = format!(
            "SELECT rowid, {w}, {d} FROM {t} \
             WHERE rowid > ?1 AND {w} IS NOT NULL AND {d} IS NOT NULL \
             ORDER BY rowid LIMIT ?2",
            w = word_col,
            d = def_col,
            t = self.table.table()
        );
        Box::new(SqlitePages {
            conn: &self.conn,
            sql,
            last_rowid: i64::MIN,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }
}

/// Keyset-paginated reader over a source table.
struct SqlitePages<'a> {
    conn: &'a Connection,
    sql: String,
    last_rowid: i64,
    buffer: VecDeque<SourceRecord>,
    exhausted: bool,
}

impl SqlitePages<'_> {
    fn fetch_page(&mut self) -> rusqlite::Result<()> {
        let conn = self.conn;
        let mut stmt = conn.prepare_cached(&self.sql)?;
        let mut rows = stmt.query(params![self.last_rowid, SOURCE_PAGE_SIZE])?;
        let mut fetched = 0;
        while let Some(row) = rows.next()? {
            fetched += 1;
            self.last_rowid = row.get(0)?;
            let word = row.get::<_, String>(1);
            let definition = row.get::<_, String>(2);
            let record = match (word, definition) {
                (Ok(word), Ok(definition)) => SourceRecord::Entry { word, definition },
                (Ok(word), Err(e)) => SourceRecord::Unreadable { word, reason: e.to_string() },
                (Err(e), _) => SourceRecord::Unreadable {
                    word: format!("rowid {}", self.last_rowid),
                    reason: e.to_string(),
                },
            };
            self.buffer.push_back(record);
        }
        if fetched < SOURCE_PAGE_SIZE {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for SqlitePages<'_> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(PackError::SourceDatabase(e)));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
