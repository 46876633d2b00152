use anyhow::Result;
use clap::{Parser, Subcommand};
use codesearch::output::print_search_result;
use codesearch::search::{CodeSearch, Operation};
use codesearch::server::{daemon_addr, DaemonClient, SearchDaemon, DAEMON_PORT};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "codesearch")]
#[command(about = "Search classes, functions and call sites by name across a source tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory to search
    #[arg(short, long, default_value = ".", global = true)]
    dir: PathBuf,

    /// Include the source text of each match
    #[arg(short, long, global = true)]
    source: bool,

    /// Ask a running daemon instead of searching directly
    #[arg(short, long, global = true)]
    client: bool,

    /// Daemon port on 127.0.0.1
    #[arg(long, default_value_t = DAEMON_PORT, global = true)]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Find class definitions whose name matches a regex
    #[command(visible_alias = "cls")]
    Classes {
        pattern: String,
    },
    /// Find function definitions whose name matches a regex
    #[command(visible_alias = "fun")]
    Functions {
        pattern: String,
    },
    /// Find call sites of a symbol
    #[command(visible_alias = "ref")]
    References {
        symbol: String,
    },
    /// Index the tree and serve queries over TCP
    Daemon,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Daemon => "codesearch=info",
        _ => "codesearch=warn",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let addr = daemon_addr(cli.port);

    let (operation, pattern) = match cli.command {
        Commands::Classes { pattern } => (Operation::Classes, pattern),
        Commands::Functions { pattern } => (Operation::Functions, pattern),
        Commands::References { symbol } => (Operation::References, symbol),
        Commands::Daemon => {
            let mut daemon = SearchDaemon::start(&cli.dir, addr, io::stderr().is_terminal())?;
            daemon.run()?;
            return Ok(());
        }
    };

    let result = if cli.client {
        DaemonClient::new(addr).search(operation, &pattern, cli.source)?
    } else {
        CodeSearch::open(&cli.dir, cli.source)?.search(operation, &pattern)?
    };

    print_search_result(&result, io::stdout().is_terminal())?;
    Ok(())
}
