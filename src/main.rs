//! # Dungeon Crawler Main Entry Point
//!
//! Parses the command line, sets up logging, and either runs the console
//! game loop or serves the engine over stdio JSON-RPC.

use clap::Parser;
use dungeon_crawler::config::MAX_GRID_SIZE;
use dungeon_crawler::{
    CrawlerError, CrawlerResult, EngineConfig, InputHandler, McpServer, PlayerInput, HELP_TEXT,
};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};

/// Command line arguments for the dungeon crawler.
#[derive(Parser, Debug)]
#[command(name = "dungeon-crawler")]
#[command(about = "A turn-based dungeon crawler driven by MCP-style tool calls")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Random seed for combat rolls
    #[arg(long)]
    combat_seed: Option<u64>,

    /// Width and height of the room grid
    #[arg(long, default_value_t = dungeon_crawler::config::DEFAULT_GRID_SIZE)]
    grid_size: u32,

    /// Depth recorded on generated dungeons
    #[arg(long, default_value_t = dungeon_crawler::config::DEFAULT_DEPTH)]
    depth: u32,

    /// Serve tools over stdio JSON-RPC instead of the console
    #[arg(long)]
    mcp_server: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn engine_config(&self) -> CrawlerResult<EngineConfig> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(CrawlerError::InvalidArgument(format!(
                "grid size must be between 1 and {}",
                MAX_GRID_SIZE
            )));
        }
        Ok(EngineConfig {
            dungeon_seed: self.seed,
            combat_seed: self.combat_seed,
            ..EngineConfig::default()
        }
        .with_grid_size(self.grid_size)
        .with_depth(self.depth))
    }
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting dungeon crawler v{}", dungeon_crawler::VERSION);

    if let Err(err) = run(&args) {
        error!("{}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Initializes `env_logger` on stderr. `RUST_LOG` wins over `--log-level`.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(args: &Args) -> CrawlerResult<()> {
    let server = McpServer::new(args.engine_config()?);

    if args.mcp_server {
        #[cfg(feature = "mcp-server")]
        {
            info!("Starting in MCP server mode");
            return dungeon_crawler::serve_stdio(server);
        }
        #[cfg(not(feature = "mcp-server"))]
        {
            error!("MCP server feature not enabled. Rebuild with --features mcp-server");
            return Err(CrawlerError::InvalidState(
                "MCP server not available".to_string(),
            ));
        }
    }

    info!("Starting in console mode");
    run_console(server)
}

/// Reads commands from stdin until `quit` or end of input.
fn run_console(mut server: McpServer) -> CrawlerResult<()> {
    let input_handler = InputHandler::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(
        stdout,
        "Dungeon Crawler v{}\nType 'new' to begin or 'help' for commands.",
        dungeon_crawler::VERSION
    )?;

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = match input_handler.read_line(&line, server.state()) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                writeln!(stdout, "{}", err)?;
                continue;
            }
        };

        match input {
            PlayerInput::Help => writeln!(stdout, "{}", HELP_TEXT)?,
            PlayerInput::Quit => break,
            PlayerInput::Call(call) => {
                let result = server.execute(call);
                if result.is_error {
                    warn!("tool call failed: {}", result.text_content());
                }
                writeln!(stdout, "{}", result.text_content())?;
            }
        }
    }

    writeln!(stdout, "Farewell.")?;
    Ok(())
}
