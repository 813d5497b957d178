//! `omcl` command-line tool: check, format, and convert OMCL files.
//!
//! ## Usage
//!
//! ```sh
//! # Validate a document (stdin → exit status, error location on stderr)
//! omcl check -i app.omcl
//!
//! # Re-render in canonical form
//! omcl fmt -i app.omcl -o app.omcl
//!
//! # Convert to and from JSON
//! omcl to-json -i app.omcl
//! echo '{"port":8080}' | omcl from-json
//!
//! # A file holding a single item or a bare array instead of a document
//! omcl check --top-level item -i value.omcl
//! ```

mod logging;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use omcl::{Value, ValueKind};

#[derive(Parser)]
#[command(name = "omcl", version, about = "OMCL configuration language CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// How the input's top level is shaped
    #[arg(long, value_enum, global = true, default_value_t = TopLevel::Object)]
    top_level: TopLevel,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TopLevel {
    /// Properties without surrounding braces
    Object,
    /// One value, e.g. `{ ... }` or `[ ... ]` or `42`
    Item,
    /// Items separated by commas or newlines, without brackets
    Array,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the input and report the first error, if any
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Re-render the input in canonical OMCL form
    Fmt {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert OMCL to pretty-printed JSON (tags are dropped)
    ToJson {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert JSON to OMCL
    FromJson {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(logging::LoggingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Check { input } => {
            let src = read_input(input.as_deref())?;
            let value = parse(&src, cli.top_level)
                .with_context(|| format!("{} is not valid OMCL", describe_input(input.as_deref())))?;
            info!("{} parsed as {}", describe_input(input.as_deref()), value.kind_name());
            println!("ok");
        }
        Commands::Fmt { input, output } => {
            let src = read_input(input.as_deref())?;
            let value = parse(&src, cli.top_level).context("Failed to parse OMCL")?;
            let text = render(&value, cli.top_level).context("Failed to render OMCL")?;
            write_output(output.as_deref(), &text)?;
        }
        Commands::ToJson { input, output } => {
            let src = read_input(input.as_deref())?;
            let value = parse(&src, cli.top_level).context("Failed to parse OMCL")?;
            let mut json = omcl::to_json(&value).context("Failed to convert OMCL to JSON")?;
            json.push('\n');
            write_output(output.as_deref(), &json)?;
        }
        Commands::FromJson { input, output } => {
            let json = read_input(input.as_deref())?;
            let value = omcl::from_json(&json).context("Failed to parse JSON")?;
            // A JSON object becomes a document; anything else a single item.
            let top_level = match value.kind() {
                ValueKind::Object(_) => TopLevel::Object,
                _ => TopLevel::Item,
            };
            let text = render(&value, top_level).context("Failed to render OMCL")?;
            write_output(output.as_deref(), &text)?;
        }
    }

    Ok(())
}

fn parse(src: &str, top_level: TopLevel) -> omcl::Result<Value> {
    let mut parser = omcl::Parser::new(src);
    match top_level {
        TopLevel::Object => parser.parse_object().map(Value::from),
        TopLevel::Item => parser.parse_item(),
        TopLevel::Array => parser.parse_array().map(Value::from),
    }
}

/// Render with a trailing newline, in the same top-level shape it was read.
fn render(value: &Value, top_level: TopLevel) -> omcl::Result<String> {
    let mut text = match (top_level, value.kind()) {
        (TopLevel::Object, ValueKind::Object(object)) => omcl::serialize_document(object)?,
        (TopLevel::Array, ValueKind::Array(array)) => {
            let items = array
                .iter()
                .map(omcl::serialize)
                .collect::<omcl::Result<Vec<_>>>()?;
            items.join("\n")
        }
        _ => omcl::serialize(value)?,
    };
    if !text.is_empty() {
        text.push('\n');
    }
    Ok(text)
}

fn describe_input(path: Option<&str>) -> String {
    path.map_or_else(|| "<stdin>".to_string(), str::to_string)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
