mod commands;
#[cfg(feature = "mcp")]
mod mcp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "scent")]
#[command(about = "Semantic nearest-neighbor search over scent descriptions", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ./scent.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default scent.yaml
    Init {
        #[arg(long, help = "Overwrite an existing config")]
        force: bool,
    },
    /// Build the scent index and show its shape
    Index {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Find the scents closest to a query
    #[command(alias = "q")]
    Query {
        query: String,
        #[arg(short, long, help = "Number of results (default: config default_k)")]
        k: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Convert raw sensor logs (<scent>.txt) into JSON records
    Convert {
        dir: PathBuf,
        #[arg(short, long, help = "Write to file instead of stdout")]
        output: Option<PathBuf>,
        #[arg(long, help = "Also write <scent>.json per log and combined_scents.json here")]
        output_dir: Option<PathBuf>,
    },

    // ===== MCP Server =====
    /// Start MCP server on stdio
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => commands::init::run(config, force),
        Commands::Index { json } => commands::index::run(config, json),
        Commands::Query { query, k, json } => commands::query::run(&query, k, config, json),
        Commands::Convert {
            dir,
            output,
            output_dir,
        } => commands::convert::run(&dir, output.as_deref(), output_dir.as_deref()),

        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions();
                Ok(())
            } else {
                run_mcp_server(config)
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn run_mcp_server(config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let config = scent_search::ScentConfig::resolve(config_path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mcp::run_mcp_server(config))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions() {
    use colored::Colorize;

    let cwd = std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "/path/to/your/project".to_string());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "scent".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(r#"{{
  "mcpServers": {{
    "scent-search": {{
      "command": "{}",
      "args": ["mcp"],
      "cwd": "{}"
    }}
  }}
}}"#, binary_path, cwd);
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Closest scents for a free-text query", "scent_query".green());
    println!("  • {} - Replace the indexed scents", "scent_index".green());
    println!("  • {} - Index size, dimension and model", "scent_status".green());
    println!("  • {} - Drop the indexed scents", "scent_reset".green());
}
