mod common;

use std::path::Path;

use common::{init_logging, write_sqlite_source, write_text_triad, TriadOptions};
use rusqlite::Connection;
use stardict_pack::bidi::{
    BidirectionalConverter, ConversionStats, ConvertOptions, DedupPolicy, Direction, EntryRow,
    EntrySink, EntrySource, LanguagePair, SqliteTableSource,
};
use stardict_pack::store::{self, PackMetadata, PackWriter};
use stardict_pack::{Result, StarDictReader};

fn fr_en() -> LanguagePair {
    LanguagePair::new("fr", "en").expect("valid pair")
}

/// Converts `source` into a fresh pack at `db` and returns the stats.
fn convert_into<S: EntrySource + ?Sized>(
    source: &mut S,
    db: &Path,
    options: ConvertOptions,
) -> ConversionStats {
    let metadata = PackMetadata::new("fr-en", fr_en(), source.provenance())
        .with_source_dict(source.description());
    let mut writer = PackWriter::create(db, &metadata).expect("create pack");
    let mut stats = ConversionStats::default();
    BidirectionalConverter::new(options)
        .convert(source, &mut writer, &fr_en(), &mut stats)
        .expect("conversion should succeed");
    writer.finish().expect("finish pack");
    stats
}

fn convert_triad(
    entries: &[(&str, &str)],
    options: ConvertOptions,
) -> (tempfile::TempDir, Connection, ConversionStats) {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let source_dir = dir.path().join("source");
    write_text_triad(&source_dir, entries, TriadOptions::default());
    let mut reader = StarDictReader::open(&source_dir).expect("open triad");
    let db = dir.path().join("fr-en.sqlite");
    let stats = convert_into(&mut reader, &db, options);
    let conn = store::open_pack(&db).expect("open pack");
    (dir, conn, stats)
}

fn lookup(conn: &Connection, lemma: &str, direction: Direction) -> Vec<String> {
    store::lookup(conn, lemma, direction, None)
        .expect("lookup")
        .into_iter()
        .map(|row| row.definition)
        .collect()
}

#[test]
fn basic_pair_produces_forward_and_reverse_rows() {
    let (_dir, conn, stats) = convert_triad(&[("chat", "cat\0\0\0")], ConvertOptions::default());

    assert_eq!(lookup(&conn, "chat", Direction::Forward), ["cat"]);
    assert_eq!(lookup(&conn, "cat", Direction::Reverse), ["chat"]);
    assert_eq!((stats.processed, stats.forward, stats.reverse, stats.skipped), (1, 1, 1, 0));

    let langs: (String, String) = conn
        .query_row(
            "SELECT source_language, target_language FROM dictionary_entries \
             WHERE direction = 'reverse'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("reverse row");
    assert_eq!(langs, ("en".to_string(), "fr".to_string()));
}

#[test]
fn semicolon_definition_keeps_primary_sense_forward() {
    let (_dir, conn, _) =
        convert_triad(&[("courir", "to run; to race")], ConvertOptions::default());

    assert_eq!(lookup(&conn, "courir", Direction::Forward), ["to run"]);
    assert_eq!(lookup(&conn, "to run", Direction::Reverse), ["courir"]);
    assert_eq!(lookup(&conn, "to race", Direction::Reverse), ["courir"]);
}

#[test]
fn definition_empty_after_cleanup_is_skipped() {
    let (_dir, conn, stats) =
        convert_triad(&[("x", "[ks]"), ("oui", "yes")], ConvertOptions::default());

    assert_eq!(stats.skipped, 1);
    assert!(lookup(&conn, "x", Direction::Forward).is_empty());
    assert_eq!(store::count_by_direction(&conn).expect("counts").forward, 1);
}

#[test]
fn rows_carry_languages_matching_their_direction() {
    let entries = [
        ("chat", "cat"),
        ("maison", "house | home"),
        ("<b>grand</b>", "big, tall, great"),
        ("courir", "1. to run; 2. to race"),
    ];
    let (_dir, conn, stats) = convert_triad(&entries, ConvertOptions::default());

    let mismatched: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM dictionary_entries WHERE \
             NOT ((direction = 'forward' AND source_language = 'fr' AND target_language = 'en') \
               OR (direction = 'reverse' AND source_language = 'en' AND target_language = 'fr'))",
            [],
            |row| row.get(0),
        )
        .expect("count");
    assert_eq!(mismatched, 0);

    let counts = store::count_by_direction(&conn).expect("counts");
    assert_eq!(counts.forward, stats.forward);
    assert_eq!(counts.reverse, stats.reverse);
    assert_eq!(counts.forward, 4);
    assert_eq!(lookup(&conn, "home", Direction::Reverse), ["maison"]);
    assert_eq!(lookup(&conn, "courir", Direction::Forward), ["to run"]);
}

#[test]
fn reverse_rows_never_point_at_themselves() {
    let (_dir, conn, _) = convert_triad(&[("taxi", "taxi, cab")], ConvertOptions::default());

    assert!(lookup(&conn, "taxi", Direction::Reverse).is_empty());
    assert_eq!(lookup(&conn, "cab", Direction::Reverse), ["taxi"]);
}

#[test]
fn lookup_ignores_ascii_case() {
    let (_dir, conn, _) = convert_triad(&[("Chat", "Cat")], ConvertOptions::default());

    assert_eq!(lookup(&conn, "CHAT", Direction::Forward), ["Cat"]);
    assert_eq!(lookup(&conn, "cat", Direction::Reverse), ["Chat"]);

    let rows = store::lookup(&conn, "chat", Direction::Forward, Some(&fr_en())).expect("lookup");
    assert_eq!(rows, vec![EntryRow::new("Chat", "Cat")]);
    let wrong_pair = LanguagePair::new("de", "en").expect("pair");
    assert!(store::lookup(&conn, "chat", Direction::Forward, Some(&wrong_pair))
        .expect("lookup")
        .is_empty());
}

#[test]
fn preserve_first_drops_repeated_rows() {
    let entries = [("chat", "cat"), ("chat", "cat"), ("matou", "cat")];

    let (_dir, conn, stats) = convert_triad(&entries, ConvertOptions::default());
    assert_eq!(lookup(&conn, "chat", Direction::Forward).len(), 2);
    assert_eq!(stats.duplicates, 0);

    let options = ConvertOptions {
        dedup: DedupPolicy::PreserveFirst,
        ..ConvertOptions::default()
    };
    let (_dir, conn, stats) = convert_triad(&entries, options);
    assert_eq!(lookup(&conn, "chat", Direction::Forward), ["cat"]);
    assert_eq!(lookup(&conn, "cat", Direction::Reverse), ["chat", "matou"]);
    assert_eq!(stats.duplicates, 2);
    assert_eq!((stats.forward, stats.reverse), (2, 2));
}

#[test]
fn html_sources_use_tag_terms_for_reverse_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source_dir = dir.path().join("source");
    write_text_triad(
        &source_dir,
        &[("Haus", "<i>n</i> <b>house</b>, <b>building</b>")],
        TriadOptions { html: true, ..Default::default() },
    );
    let mut reader = StarDictReader::open(&source_dir).expect("open triad");
    let db = dir.path().join("de-en.sqlite");
    convert_into(&mut reader, &db, ConvertOptions::default());
    let conn = store::open_pack(&db).expect("open pack");

    assert_eq!(lookup(&conn, "Haus", Direction::Forward), ["n house, building"]);
    assert_eq!(lookup(&conn, "house", Direction::Reverse), ["Haus"]);
    assert_eq!(lookup(&conn, "building", Direction::Reverse), ["Haus"]);
    assert!(lookup(&conn, "n", Direction::Reverse).is_empty());
}

#[derive(Default)]
struct RecordingSink {
    batches: Vec<(Direction, usize)>,
}

impl EntrySink for RecordingSink {
    fn write_batch(&mut self, direction: Direction, rows: &[EntryRow]) -> Result<()> {
        self.batches.push((direction, rows.len()));
        Ok(())
    }
}

#[test]
fn rows_are_flushed_in_batches_per_direction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entries: Vec<(String, String)> =
        (0..5).map(|i| (format!("mot{}", i), format!("word{}", i))).collect();
    let borrowed: Vec<(&str, &str)> =
        entries.iter().map(|(w, d)| (w.as_str(), d.as_str())).collect();
    write_text_triad(dir.path(), &borrowed, TriadOptions::default());
    let mut reader = StarDictReader::open(dir.path()).expect("open triad");

    let mut sink = RecordingSink::default();
    let mut stats = ConversionStats::default();
    let options = ConvertOptions {
        batch_size: 2,
        ..ConvertOptions::default()
    };
    BidirectionalConverter::new(options)
        .convert(&mut reader, &mut sink, &fr_en(), &mut stats)
        .expect("convert");

    let forward: Vec<usize> = sink
        .batches
        .iter()
        .filter(|(d, _)| *d == Direction::Forward)
        .map(|(_, n)| *n)
        .collect();
    assert_eq!(forward, [2, 2, 1]);
    assert_eq!(stats.forward, 5);
    assert_eq!(stats.reverse, 5);
}

#[test]
fn out_of_range_record_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_text_triad(dir.path(), &[("a", "alpha")], TriadOptions::default());
    let idx = common::index_bytes(&[(&b"a"[..], 0, 5), (&b"z"[..], 2, 50)], false);
    std::fs::write(dir.path().join("dict.idx"), idx).expect("rewrite idx");
    let mut reader = StarDictReader::open(dir.path()).expect("open triad");

    let mut sink = RecordingSink::default();
    let mut stats = ConversionStats::default();
    BidirectionalConverter::new(ConvertOptions::default())
        .convert(&mut reader, &mut sink, &fr_en(), &mut stats)
        .expect("convert");
    assert_eq!((stats.processed, stats.forward, stats.skipped), (2, 1, 1));
}

#[test]
fn sqlite_word_table_goes_through_the_same_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = write_sqlite_source(
        &dir.path().join("legacy.db"),
        "word",
        &[
            (Some("chien"), Some("<b>dog</b> [ʃjɛ̃]; hound")),
            (None, Some("orphan")),
            (Some("vide"), None),
            (Some("chat"), Some("cat")),
        ],
    );
    let mut source = SqliteTableSource::open(&source).expect("open source");
    assert_eq!(source.provenance(), "sqlite-word");
    assert_eq!(source.len_hint(), Some(2));

    let db = dir.path().join("fr-en.sqlite");
    let stats = convert_into(&mut source, &db, ConvertOptions::default());
    let conn = store::open_pack(&db).expect("open pack");

    assert_eq!(stats.processed, 2);
    assert_eq!(lookup(&conn, "chien", Direction::Forward), ["dog"]);
    assert_eq!(lookup(&conn, "hound", Direction::Reverse), ["chien"]);
    assert_eq!(
        store::read_metadata(&conn).expect("metadata").get("converted_from").map(String::as_str),
        Some("sqlite-word")
    );
}

#[test]
fn dict_table_is_preferred_over_word_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("both.sqlite");
    write_sqlite_source(&path, "dict", &[(Some("un"), Some("one"))]);
    write_sqlite_source(&path, "word", &[(Some("deux"), Some("two"))]);

    let source = SqliteTableSource::open(&path).expect("open source");
    assert_eq!(source.provenance(), "sqlite-dict");
}

#[test]
fn source_without_known_tables_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("other.sqlite");
    Connection::open(&path)
        .expect("open")
        .execute_batch("CREATE TABLE notes (body TEXT);")
        .expect("create");

    assert!(matches!(
        SqliteTableSource::open(&path),
        Err(stardict_pack::PackError::SourceNotFound(_))
    ));
}

#[test]
fn pack_metadata_records_build_facts() {
    let (_dir, conn, _) = convert_triad(&[("chat", "cat")], ConvertOptions::default());
    let metadata = store::read_metadata(&conn).expect("metadata");

    assert_eq!(metadata["pack_id"], "fr-en");
    assert_eq!(metadata["source_language"], "fr");
    assert_eq!(metadata["target_language"], "en");
    assert_eq!(metadata["pack_type"], "bidirectional");
    assert_eq!(metadata["schema_version"], "2.0");
    assert_eq!(metadata["converted_from"], "stardict");
    assert_eq!(metadata["source_dict"], "Test Dictionary");
    assert!(chrono::DateTime::parse_from_rfc3339(&metadata["created_at"]).is_ok());
}

#[test]
fn direction_constraint_rejects_unknown_values() {
    let (dir, _read_only, _) = convert_triad(&[("chat", "cat")], ConvertOptions::default());
    let db = dir.path().join("fr-en.sqlite");
    let conn = Connection::open(db).expect("open writable");
    let inserted = conn.execute(
        "INSERT INTO dictionary_entries \
         (lemma, definition, direction, source_language, target_language) \
         VALUES ('a', 'b', 'sideways', 'fr', 'en')",
        [],
    );
    assert!(inserted.is_err());
}
