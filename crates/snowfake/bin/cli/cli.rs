use clap::{Parser, Subcommand, ValueEnum};
use jiff::Timestamp;
use snowfake::{ConfigError, Layout, SnowfakeSettings};
use std::fmt::{Display, Formatter};

pub const NODE_ID_ENV: &str = "SNOWFAKE_NODE_ID";
pub const EPOCH_ENV: &str = "SNOWFAKE_EPOCH";
pub const TIME_BITS_ENV: &str = "SNOWFAKE_TIME_BITS";
pub const NODE_BITS_ENV: &str = "SNOWFAKE_NODE_BITS";
pub const SEQ_BITS_ENV: &str = "SNOWFAKE_SEQ_BITS";
pub const LOG_FORMAT_ENV: &str = "SNOWFAKE_LOG_FORMAT";

pub const DEFAULT_EPOCH: &str = "2020-01-01T00:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snowfake", about = "Generate and encode time-ordered 64-bit ids")]
pub struct CLI {
    #[arg(long, global = true, env = NODE_ID_ENV, default_value_t = 0)]
    pub node_id: u64,

    #[arg(long, global = true, env = EPOCH_ENV, default_value = DEFAULT_EPOCH)]
    pub epoch: Timestamp,

    #[arg(long, global = true, env = TIME_BITS_ENV, default_value_t = snowfake::DEFAULT_TIME_BITS)]
    pub time_bits: u8,

    #[arg(long, global = true, env = NODE_BITS_ENV, default_value_t = snowfake::DEFAULT_NODE_BITS)]
    pub node_bits: u8,

    #[arg(long, global = true, env = SEQ_BITS_ENV, default_value_t = snowfake::DEFAULT_SEQ_BITS)]
    pub seq_bits: u8,

    #[arg(
        long,
        global = true,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate new ids
    Generate {
        #[arg(short, long, default_value_t = 1)]
        count: usize,
        /// Print ids as base58 instead of decimal
        #[arg(long)]
        base58: bool,
    },
    /// Encode a decimal id as base58
    Encode { id: u64 },
    /// Decode a base58 string to a decimal id
    Decode { code: String },
    /// Show the fields of an id
    Inspect {
        id: String,
        /// Treat the id as base58 instead of decimal
        #[arg(long)]
        base58: bool,
    },
}

impl CLI {
    /// Validates the bit widths and assembles generator settings.
    pub fn settings(&self) -> Result<SnowfakeSettings, ConfigError> {
        let layout = Layout::new(self.time_bits, self.node_bits, self.seq_bits)?;
        Ok(SnowfakeSettings::builder()
            .node_id(self.node_id)
            .epoch(self.epoch)
            .layout(layout)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let cli = CLI::try_parse_from(["snowfake", "generate"]).unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.node_id, 0);
        assert_eq!(settings.epoch, snowfake::DEFAULT_EPOCH);
        assert_eq!(settings.layout, Layout::default());
        assert_eq!(cli.log_format, LogFormatArg::Text);
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = CLI::try_parse_from([
            "snowfake",
            "generate",
            "--count",
            "3",
            "--node-id",
            "2",
            "--node-bits",
            "4",
            "--seq-bits",
            "12",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Generate {
                count: 3,
                base58: false
            }
        ));
        let settings = cli.settings().unwrap();
        assert_eq!(settings.node_id, 2);
        assert_eq!(settings.layout.node_bits(), 4);
        assert_eq!(settings.layout.seq_bits(), 12);
    }

    #[test]
    fn over_budget_widths_are_reported() {
        let cli = CLI::try_parse_from(["snowfake", "--time-bits", "40", "generate"]).unwrap();
        assert_eq!(
            cli.settings().unwrap_err(),
            ConfigError::BitBudgetExceeded {
                total: 72,
                budget: 64
            }
        );
    }

    #[test]
    fn epoch_is_parsed_as_timestamp() {
        let cli = CLI::try_parse_from(["snowfake", "--epoch", "2024-06-01T00:00:00Z", "encode", "5"])
            .unwrap();
        assert_eq!(cli.epoch, "2024-06-01T00:00:00Z".parse::<Timestamp>().unwrap());
        assert!(matches!(cli.command, Command::Encode { id: 5 }));
    }

    #[test]
    fn inspect_takes_base58_flag() {
        let cli = CLI::try_parse_from(["snowfake", "inspect", "--base58", "3pqPUL"]).unwrap();
        match cli.command {
            Command::Inspect { id, base58 } => {
                assert_eq!(id, "3pqPUL");
                assert!(base58);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn inspect_settings_accept_a_future_epoch() {
        let cli = CLI::try_parse_from([
            "snowfake",
            "--epoch",
            "2999-01-01T00:00:00Z",
            "inspect",
            "5",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();
        let parts = settings.layout.decompose(1 << 24);
        assert_eq!(parts.node_id, 1);
        assert_eq!(
            parts.timestamp_at(settings.epoch),
            Some("2999-01-01T00:00:00Z".parse::<Timestamp>().unwrap())
        );
    }
}
