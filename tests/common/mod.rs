//! Synthetic StarDict triads and SQLite sources for integration tests.
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use rusqlite::{params, Connection};

/// Routes library logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TriadOptions {
    /// Write `.dict.dz` instead of `.dict`.
    pub dictzip: bool,
    /// Write `.idx.gz` instead of `.idx`.
    pub idx_gz: bool,
    /// Declare `idxoffsetbits=64` and write 8-byte offsets.
    pub offset_bits64: bool,
    /// Declare `sametypesequence=h`.
    pub html: bool,
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Builds index bytes for `(word, offset, size)` records.
pub fn index_bytes(records: &[(&[u8], u64, u32)], offset_bits64: bool) -> Vec<u8> {
    let mut idx = Vec::new();
    for (word, offset, size) in records {
        idx.extend_from_slice(word);
        idx.push(0);
        if offset_bits64 {
            idx.extend_from_slice(&offset.to_be_bytes());
        } else {
            idx.extend_from_slice(&(*offset as u32).to_be_bytes());
        }
        idx.extend_from_slice(&size.to_be_bytes());
    }
    idx
}

pub fn ifo_text(bookname: &str, wordcount: usize, options: TriadOptions) -> String {
    let mut ifo = format!(
        "StarDict's dict ifo file\nversion=2.4.2\nbookname={}\nwordcount={}\n",
        bookname, wordcount
    );
    if options.offset_bits64 {
        ifo.push_str("idxoffsetbits=64\n");
    }
    ifo.push_str(if options.html { "sametypesequence=h\n" } else { "sametypesequence=m\n" });
    ifo
}

/// Writes `<stem>.ifo`, `<stem>.idx[.gz]` and `<stem>.dict[.dz]` into `dir`,
/// laying the definitions out back to back in entry order.
pub fn write_triad(dir: &Path, stem: &str, entries: &[(&[u8], &[u8])], options: TriadOptions) {
    fs::create_dir_all(dir).expect("create triad dir");

    let mut payload = Vec::new();
    let mut records = Vec::new();
    for (word, definition) in entries {
        records.push((*word, payload.len() as u64, definition.len() as u32));
        payload.extend_from_slice(definition);
    }
    let idx = index_bytes(&records, options.offset_bits64);

    let ifo = ifo_text("Test Dictionary", entries.len(), options);
    fs::write(dir.join(format!("{}.ifo", stem)), ifo).expect("write ifo");
    if options.idx_gz {
        fs::write(dir.join(format!("{}.idx.gz", stem)), gzip(&idx)).expect("write idx.gz");
    } else {
        fs::write(dir.join(format!("{}.idx", stem)), idx).expect("write idx");
    }
    if options.dictzip {
        fs::write(dir.join(format!("{}.dict.dz", stem)), gzip(&payload)).expect("write dict.dz");
    } else {
        fs::write(dir.join(format!("{}.dict", stem)), payload).expect("write dict");
    }
}

/// Shorthand for UTF-8 string entries.
pub fn write_text_triad(dir: &Path, entries: &[(&str, &str)], options: TriadOptions) {
    let bytes: Vec<(&[u8], &[u8])> = entries
        .iter()
        .map(|(w, d)| (w.as_bytes(), d.as_bytes()))
        .collect();
    write_triad(dir, "dict", &bytes, options);
}

/// Creates a legacy SQLite dictionary with a `word(w, m)` or `dict(lemma, def)` table.
pub fn write_sqlite_source(
    path: &Path,
    table: &str,
    rows: &[(Option<&str>, Option<&str>)],
) -> PathBuf {
    let conn = Connection::open(path).expect("open source db");
    let (w, d) = match table {
        "word" => ("w", "m"),
        "dict" => ("lemma", "def"),
        other => panic!("unknown source table {}", other),
    };
    conn.execute_batch(&format!("CREATE TABLE {} ({} TEXT, {} TEXT);", table, w, d))
        .expect("create source table");
    for (word, definition) in rows {
        conn.execute(
            &format!("INSERT INTO {} ({}, {}) VALUES (?1, ?2)", table, w, d),
            params![word, definition],
        )
        .expect("insert source row");
    }
    path.to_path_buf()
}

/// Zips every file directly under `dir` into `dest`.
pub fn zip_dir(dir: &Path, dest: &Path) {
    let file = fs::File::create(dest).expect("create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut names: Vec<_> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .filter(|p| p.is_file())
        .collect();
    names.sort();
    for path in names {
        let name = path.file_name().expect("file name").to_string_lossy().into_owned();
        writer.start_file(format!("wrapped/{}", name), options).expect("start file");
        writer.write_all(&fs::read(&path).expect("read file")).expect("write entry");
    }
    writer.finish().expect("finish zip");
}

/// Packs `dir` into a gzip-compressed tar with every entry under `prefix/`.
pub fn tar_gz_dir(dir: &Path, prefix: &str, dest: &Path) {
    let file = fs::File::create(dest).expect("create tar.gz");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.append_dir_all(prefix, dir).expect("append dir");
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip");
}
