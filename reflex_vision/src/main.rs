// Minimal console runner for the reflex engine. The real deployment drives
// `ReflexBot` from a chat front end; this binary stands in for it during
// local use.

use anyhow::bail;
use reflex_vision::{IdleGuard, ReflexBot};
use std::env;
use std::io::BufRead;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let debug = args.iter().any(|arg| arg == "--debug");
    let with_idle_guard = args.iter().any(|arg| arg == "--idle-guard");
    if args
        .iter()
        .any(|arg| arg != "--debug" && arg != "--idle-guard")
    {
        bail!("usage: reflex_vision [--debug] [--idle-guard]");
    }

    let mut bot = ReflexBot::new();
    if !bot.start(debug) {
        bail!("reflex loop is already running");
    }

    let mut idle_guard = IdleGuard::new();
    if with_idle_guard && !idle_guard.start() {
        bail!("idle guard is already running");
    }

    println!("reflex loop running; press Enter to stop");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    if with_idle_guard {
        idle_guard.stop();
    }
    bot.stop();
    Ok(())
}
