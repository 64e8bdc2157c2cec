use std::fs::File;

use anyhow::{Context, Result};
use tiny_bank::{bin_utils::Service, config::BankConfig, processor::ProcessError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let filename = args
        .next()
        .context("Expected a script file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let config = match args.next() {
        Some(config_file) => {
            let source = File::open(&config_file)
                .with_context(|| format!("Failed to open `{config_file}`"))?;
            BankConfig::from_csv(source)
                .with_context(|| format!("Failed to read config from `{config_file}`"))?
        }
        None => BankConfig::default(),
    };

    let seed = std::env::var("TINY_BANK_SEED")
        .ok()
        .map(|seed| seed.parse::<u64>())
        .transpose()
        .context("TINY_BANK_SEED must be an unsigned integer")?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line: u64, err: ProcessError| {
            eprintln!("Error at line {line}: {err}")
        }),
        config,
        seed,
    };
    service.run()
}
