#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    ClearStrategy, CommandStrategy, HistoryInput, HistoryStrategy, InitStrategy, ServeInput,
    ServeStrategy, TranslateCliInput, TranslateStrategy, VersionStrategy,
};
use lingua_core::{Language, Model};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lingua")]
#[command(about = "lingua translate agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to listen on, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Translate one text
    Translate {
        text: String,

        /// Target language (Spanish, French, German, Chinese)
        #[arg(short = 'l', long)]
        language: Option<Language>,

        /// Completion model (gpt-5-nano, gpt-5-mini, gpt-5)
        #[arg(short = 'm', long)]
        model: Option<Model>,

        /// Conversation to record the translation in
        #[arg(short = 't', long)]
        thread: Option<String>,
    },
    /// Show a conversation's history
    History {
        #[arg(short = 't', long)]
        thread: String,
    },
    /// Clear a conversation's history
    Clear {
        #[arg(short = 't', long)]
        thread: String,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => ServeStrategy.execute(ServeInput { bind }).await,
        Commands::Translate {
            text,
            language,
            model,
            thread,
        } => {
            TranslateStrategy
                .execute(TranslateCliInput {
                    text,
                    language,
                    model,
                    thread,
                })
                .await
        }
        Commands::History { thread } => HistoryStrategy.execute(HistoryInput { thread }).await,
        Commands::Clear { thread } => ClearStrategy.execute(HistoryInput { thread }).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
