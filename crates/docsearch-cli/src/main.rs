mod commands;
mod output;

use clap::{Parser, Subcommand};
use docsearch_core::config::Config;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "docsearch",
    version,
    about = "Index price-list documents and search them by text or position number"
)]
struct Cli {
    /// Config file (default: docsearch/config.toml in the local data directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add documents (PDF, Excel, Word) to the list
    Ingest {
        /// Files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Show the documents in the list
    List {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Remove a document from the list
    Remove {
        /// Path of the document to remove
        file: PathBuf,
    },
    /// Find the documents and pages containing a text
    Search {
        /// Text or position number to look for
        query: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Extract text and price records from a single file without storing it
    Extract {
        /// Path to a PDF, Excel or Word file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the extracted records to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Convert a PDF price list into a table of records
    Convert {
        /// Path to the PDF file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the records to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsearch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::default_path);

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Ingest { files, output } => {
            commands::ingest::run(&config, files, &output).await
        }
        Commands::List { output } => commands::list::run(&config, &output),
        Commands::Remove { file } => commands::remove::run(&config, &file),
        Commands::Search { query, output } => commands::search::run(&config, &query, &output),
        Commands::Extract {
            input_file,
            output,
            out,
        } => commands::extract::run(&config, input_file, &output, out),
        Commands::Convert {
            input_file,
            output,
            out,
        } => commands::convert::run(&config, input_file, &output, out),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
