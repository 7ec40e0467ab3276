//! CLI for courier: request scaffolding.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use courier::scaffold::{write_request, RequestKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Courier Rust CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a request to a context (generates the request, a validator, a handler and a module).
    AddRequest {
        /// Context directory (e.g. orders)
        context: String,
        /// Request name in PascalCase (e.g. CreateOrder)
        name: String,
        /// Generate a query returning a response instead of a command
        #[arg(long)]
        query: bool,
        /// Directory the context lives under
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::AddRequest {
            context,
            name,
            query,
            root,
        } => {
            let kind = if query {
                RequestKind::Query
            } else {
                RequestKind::Command
            };
            let path = write_request(&root, &context, &name, kind)?;
            info!(path = %path.display(), "generated request");
            println!("Generated {}", path.display());
            println!(
                "Register it with: app.register(&mut {}::{}::module())?;",
                context,
                courier::scaffold::snake_case(&name)
            );
            Ok(())
        }
    }
}
