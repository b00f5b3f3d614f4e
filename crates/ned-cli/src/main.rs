mod logger;

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use ned_core::config::{RankingAlgorithm, DEFAULT_CONFIG_FILE};
use ned_core::{open_context_store, open_store, Config, Disambiguator, Document, DocumentInput};

#[derive(Parser)]
#[command(name = "ned")]
#[command(about = "Link marked entity mentions to knowledge-base resources", long_about = None)]
struct Cli {
    /// Config file (defaults to ./ned.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Disambiguate one text with <entity>...</entity> markup
    Disambiguate {
        /// Marked text; read from --file or stdin when omitted
        text: Vec<String>,

        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Override the configured ranking algorithm
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Include every ranked candidate per mention
        #[arg(long)]
        candidates: bool,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Disambiguate a JSONL file of documents, one result per line
    Batch {
        /// Input file, one `{"id", "text", "mentions"?}` object per line
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Documents processed at the same time
        #[arg(short = 'j', long, default_value_t = 4)]
        concurrency: usize,

        #[arg(long)]
        candidates: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write the default configuration to ./ned.toml
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct BatchError<'a> {
    id: &'a str,
    error: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logger::init(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => Config::load().wrap_err("failed to load configuration")?,
    };

    match cli.command {
        Commands::Disambiguate {
            text,
            file,
            algorithm,
            candidates,
            format,
        } => {
            let mut config = config;
            if let Some(algorithm) = algorithm {
                config.graph.algorithm = algorithm.parse::<RankingAlgorithm>()?;
            }
            let marked = read_text(text, file.as_deref())?;
            let mut document = Document::from_marked_text(&marked)?;

            let disambiguator = build(config)?;
            let dump = disambiguator.run(&mut document, candidates).await?;
            print(&document.result(dump), format)?;
        }
        Commands::Batch {
            input,
            output,
            concurrency,
            candidates,
        } => {
            let documents = read_documents(&input)?;
            let disambiguator = build(config)?;
            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(
                    std::fs::File::create(path)
                        .wrap_err_with(|| format!("failed to create {}", path.display()))?,
                ),
                None => Box::new(std::io::stdout().lock()),
            };
            batch(&disambiguator, documents, concurrency, candidates, &mut out).await?;
        }
        Commands::Config { init } => {
            if init {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    bail!("{DEFAULT_CONFIG_FILE} already exists");
                }
                std::fs::write(DEFAULT_CONFIG_FILE, Config::default_config_string())?;
                println!("Wrote {DEFAULT_CONFIG_FILE}");
            } else {
                config.validate()?;
                print!("{}", config.to_toml()?);
            }
        }
    }

    Ok(())
}

fn build(config: Config) -> Result<Disambiguator> {
    let store = open_store(&config)?;
    let context = open_context_store(&config)?;
    let mut disambiguator = Disambiguator::new(Arc::new(config), store)?;
    if let Some(context) = context {
        disambiguator = disambiguator.with_context_store(context);
    }
    Ok(disambiguator)
}

async fn batch(
    disambiguator: &Disambiguator,
    documents: Vec<Document>,
    concurrency: usize,
    candidates: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let progress = ProgressBar::new(documents.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} documents ({eta})")?
            .progress_chars("=> "),
    );

    let chunk_size = concurrency.max(1) * 8;
    let mut failed = 0usize;
    let mut documents = documents.into_iter().peekable();
    while documents.peek().is_some() {
        let chunk: Vec<Document> = documents.by_ref().take(chunk_size).collect();
        let ids: Vec<String> = chunk.iter().map(|d| d.id.clone()).collect();
        let results = disambiguator.run_batch(chunk, concurrency, candidates).await;

        for (id, result) in ids.iter().zip(results) {
            let line = match result {
                Ok(result) => serde_json::to_string(&result)?,
                Err(e) => {
                    failed += 1;
                    serde_json::to_string(&BatchError {
                        id,
                        error: e.to_string(),
                    })?
                }
            };
            writeln!(out, "{line}")?;
            progress.inc(1);
        }
    }
    progress.finish_and_clear();
    out.flush()?;

    info!(documents = progress.position(), failed, "batch finished");
    Ok(())
}

fn read_text(text: Vec<String>, file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()));
    }
    if !text.is_empty() {
        return Ok(text.join(" "));
    }
    let mut buf = String::new();
    std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
    Ok(buf)
}

fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let file = std::fs::File::open(path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))?;

    let mut documents = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let input: DocumentInput = serde_json::from_str(&line)
            .wrap_err_with(|| format!("{}:{}: invalid document", path.display(), number + 1))?;
        let document = input
            .into_document()
            .wrap_err_with(|| format!("{}:{}: invalid markup", path.display(), number + 1))?;
        documents.push(document);
    }
    Ok(documents)
}

fn print<T: Serialize>(value: &T, format: Format) -> Result<()> {
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{rendered}");
    Ok(())
}
