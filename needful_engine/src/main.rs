#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** needful **
//! Macro engine with a dry-run console host

use std::thread;

use anyhow::{Context, Result};
use colored::Colorize;
use log::{error, info};

use needful_engine::{ConsoleContext, MacroEngine, NEEDFUL_VERSION, load_config, run_repl};

fn main() -> Result<()> {
    env_logger::init();
    info!("Start: loading settings and macros...");
    let config = load_config();
    let engine = MacroEngine::new(config.settings);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("while building the engine runtime")?;
    let worker = engine.clone();
    let mut host = ConsoleContext::new(config.library.clone());
    let handle = thread::Builder::new()
        .name("needful-engine".into())
        .spawn(move || runtime.block_on(worker.serve(&mut host)))
        .context("while starting the engine thread")?;

    println!("{}", format!("needful v{NEEDFUL_VERSION}").bright_yellow().underline());
    println!("{}", "Type 'help' for commands, 'quit' to exit.".italic());

    let outcome = run_repl(&engine, &config.library);

    engine.shutdown();
    if handle.join().is_err() {
        error!("engine thread panicked");
    }
    info!("Shut down cleanly.");
    outcome
}
