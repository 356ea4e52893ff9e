// src/main.rs

use std::io::{self, BufReader};
use std::process;

use log::{error, info};

use tabledesk::config::Config;
use tabledesk::engine::Engine;
use tabledesk::execution::SqliteExecutor;
use tabledesk::ui::{repl, TerminalSurface};

fn main() -> io::Result<()> {
    env_logger::init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            process::exit(2);
        }
    };
    info!(
        "tabledesk: database {}, {} tables. Type help for commands, exit to quit.",
        config.database.display(),
        config.tables.len()
    );

    let executor = SqliteExecutor::new(&config.database);
    let surface = TerminalSurface::new(io::stdout());
    let mut engine = match Engine::new(executor, surface, config.tables) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    repl::run(&mut engine, BufReader::new(io::stdin()))
}
