/*
 * cli.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Command-line arguments.
//!
//! Usage and version text carry the name the program was invoked as, so the
//! command is built at runtime rather than from static attributes alone.

use crate::config::Layout;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_NAME: &str = "dita-phrases";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    about = "Generate reusable DITA phrases from AsciiDoc attributes",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Cli {
    /// specify the topic id
    #[arg(short = 'i', long = "id", value_name = "ID")]
    pub id: Option<String>,

    /// specify the topic title
    #[arg(short = 't', long = "title", value_name = "TITLE")]
    pub title: Option<String>,

    /// wrap phrases in a list or in paragraphs
    #[arg(long, value_enum, value_name = "LAYOUT", default_value_t = Layout::List)]
    pub layout: Layout,

    /// log level for diagnostics on standard error (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// AsciiDoc file to read
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// The name the program was invoked as.
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}

/// The synopsis lines, without the `Usage: ` prefix.
pub fn usage(program: &str) -> String {
    format!("{program} [-i ID] [-t TITLE] FILE\n       {program} -h|-v")
}

/// The banner printed when no input file is given.
pub fn banner(program: &str) -> String {
    format!("Usage: {}\n\n", usage(program))
}

/// The clap command, with `-h` and `-v` standing in for clap's own help and
/// version flags.
pub fn command(program: &str) -> Command {
    Cli::command()
        .name(program.to_string())
        .bin_name(program.to_string())
        .version(VERSION)
        .override_usage(usage(program))
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::Help)
                .help("display this help and exit"),
        )
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("display version information and exit"),
        )
}

/// Parse `args` (program name first).
pub fn parse_from<I, T>(program: &str, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(program).try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

/// Whether a parse "error" is really a request for help or version text.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

/// The first line of a clap error, without clap's `error: ` prefix.
pub fn error_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        parse_from("dita-phrases", std::iter::once("dita-phrases").chain(args.iter().copied()))
    }

    #[test]
    fn test_options_and_file() {
        let cli = parse(&["-i", "my-id", "--title", "My title", "attrs.adoc"]).unwrap();
        assert_eq!(cli.id.as_deref(), Some("my-id"));
        assert_eq!(cli.title.as_deref(), Some("My title"));
        assert_eq!(cli.layout, Layout::List);
        assert_eq!(cli.files, vec![PathBuf::from("attrs.adoc")]);
    }

    #[test]
    fn test_attached_values() {
        let cli = parse(&["--id=x", "-tTitle"]).unwrap();
        assert_eq!(cli.id.as_deref(), Some("x"));
        assert_eq!(cli.title.as_deref(), Some("Title"));
        assert!(cli.files.is_empty());
    }

    #[test]
    fn test_last_option_wins() {
        let cli = parse(&["-i", "first", "-i", "second"]).unwrap();
        assert_eq!(cli.id.as_deref(), Some("second"));
    }

    #[test]
    fn test_layout() {
        let cli = parse(&["--layout", "paragraph", "a.adoc"]).unwrap();
        assert_eq!(cli.layout, Layout::Paragraph);
        assert!(parse(&["--layout", "table", "a.adoc"]).is_err());
    }

    #[test]
    fn test_help_and_version_are_informational() {
        let help = parse(&["-h", "a.adoc"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        assert!(is_informational(&help));

        let version = parse(&["--version"]).unwrap_err();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
        assert!(version.to_string().contains(VERSION));
    }

    #[test]
    fn test_unknown_option() {
        let err = parse(&["--bogus", "a.adoc"]).unwrap_err();
        assert!(!is_informational(&err));
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(error_message(&err).contains("--bogus"));
        assert!(!error_message(&err).starts_with("error:"));
    }

    #[test]
    fn test_help_lists_long_only_options() {
        let help = command("tool").render_help().to_string();
        assert!(help.contains("Usage: tool [-i ID] [-t TITLE] FILE"));
        assert!(help.contains("--layout <LAYOUT>"));
        assert!(help.contains("--log-level <LEVEL>"));
    }

    #[test]
    fn test_banner() {
        assert_eq!(
            banner("tool"),
            "Usage: tool [-i ID] [-t TITLE] FILE\n       tool -h|-v\n\n"
        );
    }
}
