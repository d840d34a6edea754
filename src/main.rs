use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use scss_nav_mcp::config::settings::Settings;
use scss_nav_mcp::indexer::Position;
use scss_nav_mcp::server::ScssNavServer;
use scss_nav_mcp::tools::diagnostics::Severity;
use scss_nav_mcp::tools::{format_completions, format_diagnostics, format_location};
use scss_nav_mcp::workspace::Workspace;

#[derive(Parser, Debug)]
#[command(name = "scss-nav-mcp", about = "MCP server for SCSS code navigation")]
struct Args {
    /// Workspace root; repository paths are relative to it
    #[arg(short, long, default_value = ".", global = true)]
    project: PathBuf,

    /// Repository root with its own tsconfig.json or jsconfig.json (repeatable)
    #[arg(short, long = "repository", global = true)]
    repositories: Vec<PathBuf>,

    /// JSON settings file with a "repositories" list
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server over stdio (the default)
    Serve,
    /// Print the definition of the reference at a zero-based position
    Definition {
        file: PathBuf,
        line: usize,
        column: usize,
    },
    /// Print completions at a zero-based position
    Complete {
        file: PathBuf,
        line: usize,
        column: usize,
    },
    /// Report unresolved imports and references, for one file or all repositories
    Check { file: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing to stderr (stdout is used for MCP stdio transport)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let project_root = args.project.canonicalize()?;

    let settings = match args.settings {
        Some(ref path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let entries = settings.with_directories(&args.repositories).repositories;
    let workspace = Arc::new(Workspace::open(&project_root, entries));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("Starting scss-nav-mcp server for {}", project_root.display());

            let server = ScssNavServer::new(workspace);
            let service = server.serve(rmcp::transport::stdio()).await?;
            service.waiting().await?;
        }
        Command::Definition { file, line, column } => {
            let file = file.canonicalize()?;
            let location = workspace.definition(&file, Position::new(line, column));
            println!("{}", format_location(location.as_ref(), &project_root));
        }
        Command::Complete { file, line, column } => {
            let file = file.canonicalize()?;
            let items = workspace.completion(&file, Position::new(line, column));
            println!("{}", format_completions(&items, &project_root));
        }
        Command::Check { file } => {
            let diagnostics = match file {
                Some(file) => workspace.diagnostics(&file.canonicalize()?),
                None => workspace.check_repositories(),
            };
            println!("{}", format_diagnostics(&diagnostics, &project_root));
            if diagnostics.iter().any(|d| d.severity == Severity::Error) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
