use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stardict_pack::bidi::{
    ConvertOptions, DedupPolicy, Direction, LanguagePair, ReverseStrategy, DEFAULT_BATCH_SIZE,
};
use stardict_pack::config::BatchConfig;
use stardict_pack::pack::{
    run_batch, DirectoryPublisher, PackBuilder, PackReport, PackRequest, PackSource,
};
use stardict_pack::{store, PackError, StarDictReader};

#[derive(Debug, Parser)]
#[command(
    name = "stardict-pack",
    version,
    about = "Build bidirectional dictionary packs from StarDict dumps"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build one pack.
    Convert(ConvertArgs),
    /// Build every pack listed in a TOML file.
    Batch {
        #[arg(long)]
        config: PathBuf,
    },
    /// Show metadata and the first entries of a StarDict directory.
    Info {
        dir: PathBuf,
        #[arg(long, default_value_t = 10)]
        sample: usize,
    },
    /// Look a lemma up in a built pack.
    Lookup {
        #[arg(long)]
        db: PathBuf,
        #[arg(long)]
        lemma: String,
        #[arg(long, value_enum, default_value_t = Direction::Forward)]
        direction: Direction,
    },
}

#[derive(Debug, clap::Args)]
struct ConvertArgs {
    /// Directory, SQLite file, zip or tar.gz archive, or URL.
    #[arg(long)]
    source: String,
    #[arg(long)]
    source_lang: String,
    #[arg(long)]
    target_lang: String,
    #[arg(long, default_value = "packs")]
    out: PathBuf,
    #[arg(long)]
    pack_id: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, value_enum)]
    reverse_strategy: Option<ReverseStrategy>,
    #[arg(long, value_enum, default_value_t = DedupPolicy::KeepAll)]
    dedup: DedupPolicy,
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    #[arg(long)]
    publish_dir: Option<PathBuf>,
    #[arg(long, requires = "publish_dir")]
    base_url: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Convert(args) => convert(args),
        Command::Batch { config } => batch(&config),
        Command::Info { dir, sample } => info(&dir, sample),
        Command::Lookup { db, lemma, direction } => lookup(&db, &lemma, direction),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\nERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn convert(args: ConvertArgs) -> Result<ExitCode, PackError> {
    let pair = LanguagePair::new(&args.source_lang, &args.target_lang)?;
    let mut request = PackRequest::new(pair, PackSource::parse(&args.source));
    if let Some(pack_id) = &args.pack_id {
        request = request.with_pack_id(pack_id)?;
    }
    request.name = args.name;

    let options = ConvertOptions {
        reverse_strategy: args.reverse_strategy,
        dedup: args.dedup,
        batch_size: args.batch_size.max(1),
        ..ConvertOptions::default()
    };
    let mut builder = PackBuilder::new(args.out, options);
    if let Some(dir) = args.publish_dir {
        builder = builder.with_publisher(Box::new(DirectoryPublisher::new(dir, args.base_url)));
    }

    match builder.build(&request) {
        Ok(report) => {
            print_report(&report);
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            eprintln!("\nERROR: {}", failure);
            eprintln!("  forward: {}", failure.stats.forward);
            eprintln!("  reverse: {}", failure.stats.reverse);
            eprintln!("  skipped: {}", failure.stats.skipped + failure.stats.undecodable_words);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn batch(config_path: &Path) -> Result<ExitCode, PackError> {
    let config = BatchConfig::load(config_path)?;
    let requests = config.requests()?;
    let summary = run_batch(&config.builder(), &requests);

    for report in &summary.built {
        print_report(report);
    }
    println!("\n{}", "=".repeat(60));
    println!(
        "Built: {}  Failed: {}  Entries: {}",
        summary.built.len(),
        summary.failed.len(),
        summary.total_entries()
    );
    for failure in &summary.failed {
        println!("  FAILED {}", failure);
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &PackReport) {
    let stats = &report.stats;
    println!("\n{}", "=".repeat(60));
    println!("Pack {} built", report.pack_id);
    println!("{}", "=".repeat(60));
    println!("  Forward entries: {}", report.counts.forward);
    println!("  Reverse entries: {}", report.counts.reverse);
    println!("  Total entries: {}", report.counts.total());
    println!("  Skipped: {}", stats.skipped + stats.undecodable_words);
    if stats.duplicates > 0 {
        println!("  Duplicates dropped: {}", stats.duplicates);
    }
    if stats.index_truncated {
        println!("  Warning: source index was truncated");
    }
    println!("  Database: {}", report.database.display());
    println!("  Archive: {} ({} bytes)", report.archive.display(), report.manifest.size_bytes);
    println!("  SHA-256: {}", report.manifest.checksum);
    println!("  Manifest: {}", report.manifest_path.display());
    if let Some(url) = &report.manifest.download_url {
        println!("  Download URL: {}", url);
    }
}

fn info(dir: &Path, sample: usize) -> Result<ExitCode, PackError> {
    println!("Reading StarDict dictionary: {}", dir.display());
    println!("{}", "=".repeat(60));

    let reader = StarDictReader::open(dir)?;
    let files = reader.files();

    println!("\nDictionary Information:");
    if let Some(name) = reader.info.bookname() {
        println!("  Title: {}", name);
    }
    let mut keys: Vec<_> = reader.info.fields.iter().collect();
    keys.sort();
    for (key, value) in keys {
        if key != "bookname" {
            println!("  {}: {}", key, value);
        }
    }

    println!("\nFiles:");
    println!("  ifo:  {}", files.ifo.display());
    let idx_note = if files.idx_is_gzipped() { " (gzip)" } else { "" };
    let dict_note = if files.dict_is_dictzip() { " (dictzip)" } else { "" };
    println!("  idx:  {}{}", files.idx.display(), idx_note);
    println!("  dict: {}{}", files.dict.display(), dict_note);

    println!("\nStatistics:");
    println!("  Index entries: {}", reader.num_entries());
    if let Some(declared) = reader.info.wordcount() {
        println!("  Declared wordcount: {}", declared);
    }
    println!("  Undecodable words: {}", reader.undecodable_words());
    println!("  Index truncated: {}", reader.index_truncated());

    println!("\nSample Entries (first {}):", sample);
    for (i, (entry, definition)) in reader.iter_definitions().take(sample).enumerate() {
        match definition {
            Ok(text) => {
                let first_line = text.lines().next().unwrap_or_default();
                println!("  {}. {} => {}", i + 1, entry.word, first_line);
            }
            Err(e) => println!("  {}. {} => <unreadable: {}>", i + 1, entry.word, e),
        }
    }
    if reader.num_entries() > sample {
        println!("  ... and {} more", reader.num_entries() - sample);
    }
    Ok(ExitCode::SUCCESS)
}

fn lookup(db: &Path, lemma: &str, direction: Direction) -> Result<ExitCode, PackError> {
    let conn = store::open_pack(db)?;
    let rows = store::lookup(&conn, lemma, direction, None)?;
    if rows.is_empty() {
        println!("No {} entries for '{}'", direction, lemma);
        return Ok(ExitCode::FAILURE);
    }
    for row in rows {
        println!("{} => {}", row.lemma, row.definition);
    }
    Ok(ExitCode::SUCCESS)
}
