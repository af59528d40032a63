use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::{Config, OutputFormat, TriggerMode};
use crate::parser::ScoreSeparator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeparatorArg {
    Dash,
    DashOrSpace,
}

impl From<SeparatorArg> for ScoreSeparator {
    fn from(arg: SeparatorArg) -> Self {
        match arg {
            SeparatorArg::Dash => ScoreSeparator::Dash,
            SeparatorArg::DashOrSpace => ScoreSeparator::DashOrSpace,
        }
    }
}

/// Count how many doubles games each player appears in.
///
/// Each line holds one game: "PlayerA PlayerB 21-12 PlayerC PlayerD".
#[derive(Debug, Parser)]
#[command(name = "doubles-tally", version, about)]
pub struct Cli {
    /// File with game results, one per line ("-" or omitted reads stdin)
    pub input: Option<PathBuf>,

    /// Type results in a terminal editor instead of reading a file
    #[arg(short, long)]
    pub interactive: bool,

    /// Recount after every keystroke (implies --interactive)
    #[arg(short, long)]
    pub live: bool,

    /// Require exactly this many players per team
    #[arg(short = 't', long, value_name = "N")]
    pub team_size: Option<usize>,

    /// Which separators are accepted between score numbers
    #[arg(short, long, value_enum)]
    pub separator: Option<SeparatorArg>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Whether the terminal editor should be opened
    pub fn wants_session(&self) -> bool {
        self.interactive || self.live
    }

    /// Overlay command-line flags onto loaded settings
    pub fn apply(&self, config: &mut Config) {
        if let Some(size) = self.team_size {
            config.parse.team_size = Some(size);
        }
        if let Some(separator) = self.separator {
            config.parse.score_separator = separator.into();
        }
        if self.live {
            config.trigger_mode = TriggerMode::Live;
        }
        if self.json {
            config.output = OutputFormat::Json;
        }
    }

    /// Default log filter for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
