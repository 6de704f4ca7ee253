//! Price List Importer CLI
//!
//! Command-line tool for extracting, reviewing, editing and importing price lists.

mod repl;

use clap::{Parser, Subcommand, ValueEnum};
use pricelist_core::export::load_rows;
use pricelist_core::{logging, ArtifactKind, Config, HttpService, Session};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pricelist")]
#[command(about = "Price list importer", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Service address, overriding the config file and PRICELIST_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a document to the extraction service and save its rows
    Extract {
        /// Document to upload
        #[arg(short, long)]
        file: PathBuf,

        /// Where to write the extracted rows (JSON); prints them if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse pasted brand,model,type,dp,mrp lines into rows
    Paste {
        /// Text file with one row per line
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the rows (JSON); prints them if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the working headers inferred from a rows file
    Headers {
        /// Rows file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the normalized payload that would be imported
    Resolve {
        /// Rows file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Export rows to a file
    Export {
        /// Rows file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Normalize rows and submit them to the import service
    Import {
        /// Rows file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Review and edit rows interactively
    Edit {
        /// Rows file (JSON) to start from
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Export formats understood by `export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Rows under their working headers
    Csv,
    /// Rows as indented JSON
    Json,
    /// Normalized payload under the canonical headers
    Canonical,
}

impl ExportFormat {
    /// Encode the session's rows in this format
    pub fn encode(self, session: &Session) -> pricelist_core::Result<String> {
        match self {
            ExportFormat::Csv => session.export_csv(),
            ExportFormat::Json => session.export_json(),
            ExportFormat::Canonical => session.export_canonical_csv(),
        }
    }

    pub fn artifact_kind(self) -> ArtifactKind {
        match self {
            ExportFormat::Json => ArtifactKind::Json,
            ExportFormat::Csv | ExportFormat::Canonical => ArtifactKind::Csv,
        }
    }
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> pricelist_core::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.api_url)?;

    match cli.command {
        Commands::Extract { file, output } => cmd_extract(config, &file, output.as_deref()),
        Commands::Paste { input, output } => cmd_paste(&input, output.as_deref()),
        Commands::Headers { input } => cmd_headers(config, &input),
        Commands::Resolve { input } => cmd_resolve(config, &input),
        Commands::Export {
            input,
            format,
            output,
        } => cmd_export(config, &input, format, &output),
        Commands::Import { input } => cmd_import(config, &input),
        Commands::Edit { input } => cmd_edit(config, input.as_deref()),
    }
}

fn load_config(path: Option<&Path>, api_url: Option<String>) -> pricelist_core::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = config.with_env().with_api_url_override(api_url);
    tracing::debug!(api_url = %config.api_url, "configuration loaded");
    Ok(config)
}

fn read_file(path: &Path) -> pricelist_core::Result<Vec<u8>> {
    fs::read(path).map_err(|e| pricelist_core::Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string())
}

fn write_or_print(output: Option<&Path>, content: &str) -> pricelist_core::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn open_session(config: Config, input: &Path) -> pricelist_core::Result<Session> {
    Ok(Session::with_rows(config, load_rows(input)?))
}

fn cmd_extract(config: Config, file: &Path, output: Option<&Path>) -> pricelist_core::Result<()> {
    let bytes = read_file(file)?;
    let service = HttpService::new(&config)?;
    let mut session = Session::new(config);

    let result = session.extract(&service, &file_name(file), bytes);
    eprintln!("{}", session.status());
    result?;

    write_or_print(output, &session.export_json()?)
}

fn cmd_paste(input: &Path, output: Option<&Path>) -> pricelist_core::Result<()> {
    let bytes = read_file(input)?;
    let text = String::from_utf8_lossy(&bytes);
    let rows = pricelist_core::parse_paste_records(&text);

    eprintln!("Parsed {} rows", rows.len());
    write_or_print(output, &pricelist_core::encode_json(&rows)?)
}

fn cmd_headers(config: Config, input: &Path) -> pricelist_core::Result<()> {
    let session = open_session(config, input)?;

    println!("Headers ({}):", session.headers().len());
    for header in session.headers() {
        println!("  {}", header);
    }

    Ok(())
}

fn cmd_resolve(config: Config, input: &Path) -> pricelist_core::Result<()> {
    let session = open_session(config, input)?;
    let json = serde_json::to_string_pretty(&session.payload())?;
    println!("{}", json);
    Ok(())
}

fn cmd_export(
    config: Config,
    input: &Path,
    format: ExportFormat,
    output: &Path,
) -> pricelist_core::Result<()> {
    let session = open_session(config, input)?;
    let content = format.encode(&session)?;

    fs::write(output, content)?;
    println!("Exported {} rows to {}", session.len(), output.display());

    Ok(())
}

fn cmd_import(config: Config, input: &Path) -> pricelist_core::Result<()> {
    let service = HttpService::new(&config)?;
    let mut session = open_session(config, input)?;

    let receipt = session.submit(&service);
    println!("{}", session.status());
    let receipt = receipt?;

    println!(
        "Imported {} rows at {}",
        receipt.row_count,
        receipt.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    Ok(())
}

fn cmd_edit(config: Config, input: Option<&Path>) -> pricelist_core::Result<()> {
    let service = HttpService::new(&config)?;
    let mut session = match input {
        Some(path) => open_session(config, path)?,
        None => Session::new(config),
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{} rows loaded. Type 'help' for commands.", session.len())?;

    repl::run(&mut session, &service, stdin.lock(), &mut stdout)?;

    Ok(())
}
