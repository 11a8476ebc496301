//! querycanvas CLI - compile saved query canvases to SQL
//!
//! Usage:
//!   querycanvas compile <query.json> [--format sql|json] [--totals] [--pretty]
//!   querycanvas catalog <query.json>
//!
//! Set `RUST_LOG=debug` to trace join planning.

use clap::{Parser, Subcommand, ValueEnum};
use querycanvas::config::Settings;
use querycanvas::document::QueryDocument;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "querycanvas")]
#[command(about = "Compile a visual query canvas into SQL")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $QUERYCANVAS_CONFIG, then ./querycanvas.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query document
    Compile {
        /// Path to the query document (JSON)
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        format: OutputFormat,

        /// Force the totals row on
        #[arg(long)]
        totals: bool,

        /// One clause per line
        #[arg(long)]
        pretty: bool,
    },

    /// List the schemas, tables and columns of a query document's catalog
    Catalog {
        /// Path to the query document (JSON)
        file: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Rendered SQL statement
    Sql,
    /// Clause bundle as JSON
    Json,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Compile {
            file,
            format,
            totals,
            pretty,
        } => cmd_compile(file, format, totals, pretty, settings),
        Commands::Catalog { file } => cmd_catalog(file),
    }
}

fn read_document(file: &Path) -> Option<QueryDocument> {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return None;
        }
    };

    match QueryDocument::from_json(&source) {
        Ok(doc) => Some(doc),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn cmd_compile(
    file: PathBuf,
    format: OutputFormat,
    totals: bool,
    pretty: bool,
    mut settings: Settings,
) -> ExitCode {
    let Some(document) = read_document(&file) else {
        return ExitCode::FAILURE;
    };
    if pretty {
        settings.render.pretty = true;
    }

    let catalog = match document.catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut query = match document.load(&catalog, &settings.compile) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if totals {
        query.totals = true;
    }

    for instance in query.canvas.unrelated_instances() {
        if let Ok(placed) = query.canvas.instance(instance) {
            eprintln!(
                "Warning: table '{}' ({}) has no relationships and is left out of FROM",
                catalog.full_name(placed.table),
                instance
            );
        }
    }

    let bundle = match query.compile() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Compilation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Sql => println!("{}", bundle.to_sql(&settings.render)),
        OutputFormat::Json => match serde_json::to_string_pretty(&bundle) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn cmd_catalog(file: PathBuf) -> ExitCode {
    let Some(document) = read_document(&file) else {
        return ExitCode::FAILURE;
    };

    let catalog = match document.catalog() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for schema in catalog.schemas() {
        println!("{}", schema.name);
        for table_id in &schema.tables {
            println!("  {}", catalog.table(*table_id).name);
            for column in catalog.columns_of(*table_id) {
                let marker = if column.is_pk { " (pk)" } else { "" };
                println!("    {}{}", column.name, marker);
            }
        }
    }

    ExitCode::SUCCESS
}
