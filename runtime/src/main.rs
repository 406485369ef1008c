// Copyright 2026 Roster Scout Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use roster_scout::cli::{self, discover_cmd::DiscoverArgs, output};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "roster-scout",
    about = "Roster Scout: find college athletics roster pages and read their players",
    version,
    after_help = "Run 'roster-scout <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover athletics programs and their roster pages
    Discover {
        #[command(flatten)]
        args: DiscoverArgs,
        /// Include the per-state fetch trace
        #[arg(long)]
        diag: bool,
    },
    /// Discover with the cache bypassed
    Rebuild {
        #[command(flatten)]
        args: DiscoverArgs,
        /// Include the per-state fetch trace
        #[arg(long)]
        diag: bool,
    },
    /// Extract players from a roster page
    Extract {
        /// Absolute roster URL
        url: String,
    },
    /// Rank discovered programs for a recruit
    Matches {
        #[command(flatten)]
        args: DiscoverArgs,
        /// Recruit's position, matched as a substring (e.g. "P", "guard")
        #[arg(long)]
        position: String,
        /// freshman, sophomore, junior or senior
        #[arg(long)]
        class_level: String,
        /// Include the discovery fetch trace
        #[arg(long)]
        debug: bool,
    },
    /// Serve the REST API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind
        #[arg(long, default_value = "8000")]
        port: u16,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose {
        "roster_scout=debug"
    } else {
        "roster_scout=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    if cli.no_color {
        std::env::set_var(output::NO_COLOR_ENV, "1");
    }
    init_tracing(cli.verbose, cli.json);

    let result = match cli.command {
        Commands::Discover { args, diag } => cli::discover_cmd::run(&args, diag).await,
        Commands::Rebuild { args, diag } => cli::discover_cmd::run_rebuild(&args, diag).await,
        Commands::Extract { url } => cli::extract_cmd::run(&url).await,
        Commands::Matches {
            args,
            position,
            class_level,
            debug,
        } => cli::matches_cmd::run(&args, &position, &class_level, debug).await,
        Commands::Serve { host, port } => cli::serve_cmd::run(&host, port).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "roster-scout", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !output::is_quiet() && !output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
