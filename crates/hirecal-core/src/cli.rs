use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hirecal",
    version,
    about = "Recruitment calendar: month grids and event agendas",
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render the month grid with per-day event counts (default command).
    Show {
        /// Month to show: YYYY-MM or a month name; defaults to the current month.
        month: Option<String>,
    },

    /// Create an event.
    Add {
        title: String,

        /// Event date: YYYY-MM-DD, today/tomorrow, or +Nd.
        #[arg(long)]
        date: String,

        /// interview, screening, meeting, call, followup, internal or task.
        #[arg(long = "type", value_name = "TYPE")]
        kind: String,

        /// Start time, HH:MM.
        #[arg(long)]
        time: String,

        #[arg(long, default_value_t = 60)]
        duration: u32,

        #[arg(long)]
        location: Option<String>,

        #[arg(long = "attendee", action = ArgAction::Append)]
        attendees: Vec<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List events as an agenda, optionally filtered
    /// (type:interview, from:2025-04-01, to:+7d, free text).
    List {
        terms: Vec<String>,
    },

    /// Remove an event by uuid or unique uuid prefix.
    Remove {
        id: String,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Command, GlobalCli};

    #[test]
    fn parses_show_with_month() {
        let cli = GlobalCli::parse_from(["hirecal", "show", "2025-04"]);
        match cli.command {
            Some(Command::Show { month }) => assert_eq!(month.as_deref(), Some("2025-04")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_add_with_repeated_attendees() {
        let cli = GlobalCli::parse_from([
            "hirecal",
            "add",
            "Onsite loop",
            "--date",
            "2025-04-20",
            "--type",
            "interview",
            "--time",
            "14:00",
            "--attendee",
            "dana",
            "--attendee",
            "miguel",
        ]);
        match cli.command {
            Some(Command::Add {
                title,
                kind,
                attendees,
                duration,
                ..
            }) => {
                assert_eq!(title, "Onsite loop");
                assert_eq!(kind, "interview");
                assert_eq!(attendees, vec!["dana", "miguel"]);
                assert_eq!(duration, 60);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rc_overrides_accumulate() {
        let cli = GlobalCli::parse_from(["hirecal", "--rc", "color=off", "--rc", "a=b", "list"]);
        assert_eq!(cli.rc_overrides.len(), 2);
        assert_eq!(cli.rc_overrides[0].key, "color");
        assert_eq!(cli.rc_overrides[0].value, "off");
    }
}
