use clap::Parser;

use crate::alias::DEFAULT_ALIAS_FILE;

#[derive(Parser, Debug)]
#[command(name = "jtvzip")]
#[command(version)]
#[command(about = "Print the TV schedule stored in a JTV archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  jtvzip tvprog.zip                          print every channel\n  \
  jtvzip -t 3 -c NTV tvprog.zip              one channel, times shifted by +3h\n  \
  jtvzip --list-channels https://example.com/jtv.zip   channels of a remote archive")]
pub struct Cli {
    /// JTV zip file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Channel alias file
    #[arg(short = 'a', long = "aliases", value_name = "FILE", env = "JTV_ALIASES")]
    pub aliases: Option<String>,

    /// Hours added to every program time. Times are UTC by default; use -3
    /// to reproduce the output of readers built on the three-hour-late epoch
    #[arg(short = 't', long = "tz", value_name = "HOURS", default_value_t = 0, allow_negative_numbers = true)]
    pub tz_correction: i32,

    /// Codepage of member filenames (overrides the alias file)
    #[arg(long = "cp-zip-fn", value_name = "CODEPAGE")]
    pub cp_zip_fn: Option<String>,

    /// Codepage of program titles (overrides the alias file)
    #[arg(long = "cp-content", value_name = "CODEPAGE")]
    pub cp_content: Option<String>,

    /// Only show these channels (display names, case-insensitive)
    #[arg(short = 'c', long = "channel", value_name = "NAME")]
    pub channels: Vec<String>,

    /// Date format (strftime)
    #[arg(long = "date-format", value_name = "FMT", default_value = "%x")]
    pub date_format: String,

    /// Time format (strftime)
    #[arg(long = "time-format", value_name = "FMT", default_value = "%X")]
    pub time_format: String,

    /// Also show when each program ends
    #[arg(short = 'e', long = "end")]
    pub show_end: bool,

    /// List channel names and program counts only
    #[arg(short = 'l', long = "list-channels")]
    pub list_channels: bool,

    /// Report channels that were skipped and why
    #[arg(long = "skipped")]
    pub show_skipped: bool,

    /// Verbose logging (-vv => trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode, errors only
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    /// Alias file to load and whether the user named it.
    pub fn alias_path(&self) -> (&str, bool) {
        match &self.aliases {
            Some(path) => (path.as_str(), true),
            None => (DEFAULT_ALIAS_FILE, false),
        }
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    /// Whether a channel passes the `-c` filter.
    pub fn wants_channel(&self, name: &str) -> bool {
        self.channels.is_empty() || self.channels.iter().any(|c| c.to_lowercase() == name.to_lowercase())
    }
}
