use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::{params, Connection};

use super::schema::{self, PackMetadata};
use crate::bidi::{Direction, EntryRow, EntrySink, LanguagePair};
use crate::error::Result;

const INSERT_ENTRY: &str = "INSERT INTO dictionary_entries \
    (lemma, definition, direction, source_language, target_language) VALUES (?1, ?2, ?3, ?4, ?5)";

/// Writes a fresh pack database.
///
/// Every [`EntrySink::write_batch`] call is one committed transaction.
pub struct PackWriter {
    conn: Connection,
    path: PathBuf,
    pair: LanguagePair,
}

impl PackWriter {
    /// Creates the schema at `path` and writes `metadata`.
    ///
    /// Any existing content of `path` is replaced.
    pub fn create(path: impl AsRef<Path>, metadata: &PackMetadata) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "cache_size", 10000)?;
        schema::initialize(&conn, metadata)?;
        debug!("Created pack database {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            pair: metadata.pair.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn insert_batch(&mut self, direction: Direction, rows: &[EntryRow]) -> Result<()> {
        let (source_language, target_language) = self.pair.languages_for(direction);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_ENTRY)?;
            for row in rows {
                stmt.execute(params![
                    row.lemma,
                    row.definition,
                    direction.as_str(),
                    source_language,
                    target_language
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Closes the connection so the file can be zipped and renamed.
    pub fn finish(self) -> Result<PathBuf> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| e)?;
        info!("Finalized pack database {}", path.display());
        Ok(path)
    }
}

impl EntrySink for PackWriter {
    fn write_batch(&mut self, direction: Direction, rows: &[EntryRow]) -> Result<()> {
        self.insert_batch(direction, rows)
    }
}
