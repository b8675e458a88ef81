mod cli;

use crate::cli::{Command, LogFormatArg, CLI};
use clap::Parser;
use snowfake::{base58, Snowfake};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    match &config.command {
        Command::Generate { count, base58: as_base58 } => {
            let generator = build_generator(&config)?;
            for _ in 0..*count {
                let id = generator.next_id()?;
                if *as_base58 {
                    println!("{}", base58::encode(id));
                } else {
                    println!("{id}");
                }
            }
        }
        Command::Encode { id } => println!("{}", base58::encode(*id)),
        Command::Decode { code } => println!("{}", base58::decode(code)?),
        Command::Inspect { id, base58: is_base58 } => {
            let id = if *is_base58 {
                base58::decode(id)?
            } else {
                id.parse::<u64>()?
            };
            let settings = config.settings()?;
            let parts = settings.layout.decompose(id);
            println!("id:        {id}");
            println!("base58:    {}", base58::encode(id));
            println!("timestamp: {}", parts.timestamp);
            match parts.timestamp_at(settings.epoch) {
                Some(at) => println!("time:      {at}"),
                None => println!("time:      out of range"),
            }
            println!("node_id:   {}", parts.node_id);
            println!("sequence:  {}", parts.sequence);
        }
    }

    Ok(())
}

fn build_generator(
    config: &CLI,
) -> Result<Snowfake<snowfake::SystemClock>, Box<dyn std::error::Error>> {
    let settings = config.settings()?;

    info!(
        node_id = settings.node_id,
        epoch = %settings.epoch,
        time_bits = settings.layout.time_bits(),
        node_bits = settings.layout.node_bits(),
        seq_bits = settings.layout.seq_bits(),
        "starting snowfake generator"
    );

    Ok(Snowfake::new(settings)?)
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}
