use std::fmt::Display;

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};

use rdsgroup::{AfPair, GroupKind, ProgramService, ProgramType, RadioText};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program encodes and decodes RDS/RBDS group bitstreams for group types 0A (basic tuning and switching information) and 2A (RadioText). Bitstreams are plain '0'/'1' text with no delimiters.

See --help for more details.
"#;

const USAGE_LONG: &str = r#"
This program encodes and decodes RDS/RBDS group bitstreams for group types 0A (basic tuning and switching information) and 2A (RadioText). Bitstreams are plain '0'/'1' text with no delimiters.

Encode a type 0A transmission:

    rdstool encode --group 0A --pi 4660 --pty 5 --tp 1 \
        --ms 0 --ta 1 --af 104.5,98.0 --ps RadioXYZ

Encode a type 2A transmission:

    rdstool encode --group 2A --pi 4660 --pty 5 --tp 1 \
        --rt "Now Playing Song Title by Artist" --ab 0

Decode a bitstream, from an argument or from standard input:

    rdstool decode --bits 000100100011...
    rdstool encode --group 0A ... | rdstool decode

The decoder synchronizes purely on block checkwords: leading garbage, rotated block alignment, and reordered groups are all tolerated. Fields assembled from an incomplete stream are flagged as such.
"#;

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING except the encoded or decoded output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Encode broadcast fields into a group bitstream
    Encode(EncodeArgs),

    /// Decode a group bitstream into broadcast fields
    Decode(DecodeArgs),
}

/// Arguments for `rdstool encode`
#[derive(clap::Args, Clone, Debug)]
pub struct EncodeArgs {
    /// Group type to encode (0A or 2A)
    #[arg(short, long)]
    pub group: GroupKind,

    /// Program Identification (0-65535)
    #[arg(long)]
    pub pi: u16,

    /// Programme Type (0-31)
    #[arg(long)]
    pub pty: ProgramType,

    /// Traffic Program flag (0 or 1)
    #[arg(long, value_parser = parse_bit, action = clap::ArgAction::Set)]
    pub tp: bool,

    /// Music/Speech flag: 0 speech, 1 music (group 0A)
    #[arg(long, value_parser = parse_bit, action = clap::ArgAction::Set)]
    #[arg(required_if_eq("group", "0A"))]
    pub ms: Option<bool>,

    /// Traffic Announcement flag (group 0A)
    #[arg(long, value_parser = parse_bit, action = clap::ArgAction::Set)]
    #[arg(required_if_eq("group", "0A"))]
    pub ta: Option<bool>,

    /// Alternative Frequencies: two comma-separated MHz values,
    /// like "104.5,98.0" (group 0A)
    #[arg(long)]
    #[arg(required_if_eq("group", "0A"))]
    pub af: Option<AfPair>,

    /// Program Service name, up to 8 characters (group 0A)
    #[arg(long)]
    #[arg(required_if_eq("group", "0A"))]
    pub ps: Option<ProgramService>,

    /// Radio Text, up to 64 characters (group 2A)
    #[arg(long)]
    #[arg(required_if_eq("group", "2A"))]
    #[arg(conflicts_with_all = ["ms", "ta", "af", "ps"])]
    pub rt: Option<RadioText>,

    /// Radio Text A/B flag (group 2A)
    #[arg(long, value_parser = parse_bit, action = clap::ArgAction::Set)]
    #[arg(required_if_eq("group", "2A"))]
    #[arg(conflicts_with_all = ["ms", "ta", "af", "ps"])]
    pub ab: Option<bool>,
}

/// Arguments for `rdstool decode`
#[derive(clap::Args, Clone, Debug)]
pub struct DecodeArgs {
    /// The '0'/'1' bitstream (or "-" to read stdin)
    #[arg(short, long, default_value_t = STDIN_FILE.to_string())]
    pub bits: String,
}

impl DecodeArgs {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.bits == STDIN_FILE
    }
}

// Boolean flags are spelled 0/1 on the wire and on the command line
fn parse_bit(value: &str) -> Result<bool, String> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(format!("\"{}\" must be 0 or 1", value)),
    }
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}
