/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * dita-phrases - generate reusable DITA phrases from AsciiDoc attributes
 */

use adoc_engine::Asciidoc;
use anyhow::Result;
use dita_phrases::{PhraseError, cli, generate, validate};
use std::io::Write;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const INCLUDE_BASE_DIR: &str = ".";
const DEFAULT_LOG_FILTER: &str = "dita_phrases=warn,adoc_engine=warn";

fn main() -> Result<()> {
    let program = cli::program_name();

    let args = match cli::parse_from(&program, std::env::args_os()) {
        Ok(args) => args,
        Err(err) if cli::is_informational(&err) => {
            err.print()?;
            return Ok(());
        }
        Err(err) => fail(&program, &cli::error_message(&err)),
    };

    init_logging(args.log_level.as_deref());

    let config = match validate::config_from_args(args) {
        Ok(config) => config,
        Err(PhraseError::MissingInput) => {
            print!("{}", cli::banner(&program));
            println!("Run '{program} -h' for more information");
            std::process::exit(1);
        }
        Err(err) => fail(&program, &err.to_string()),
    };

    // The document is read as a string, so includes resolve against the
    // working directory rather than the input file's directory.
    let engine = Asciidoc::with_includes_from(INCLUDE_BASE_DIR);
    let topic = match generate(&config, &engine) {
        Ok(topic) => topic,
        Err(err) => fail(&program, &err.to_string()),
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(topic.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn fail(program: &str, message: &str) -> ! {
    eprintln!("{program}: {message}");
    std::process::exit(1);
}

/// Log to stderr so diagnostics never mix with the topic on stdout.
fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|level| {
            EnvFilter::try_new(format!("dita_phrases={level},adoc_engine={level}")).ok()
        })
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
