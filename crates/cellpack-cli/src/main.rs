use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cellpack_core::{CATALOG, DecodedPayload, PayloadFormat, ValueMode};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("CELLPACK_BUILD_COMMIT"),
    ", ",
    env!("CELLPACK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "cellpack")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for compact cellular sensor telemetry payloads.",
    long_about = None,
    after_help = "Examples:\n  cellpack payload decode uplink.bin -o reading.json\n  cellpack payload decode --hex 20050500000000000000c4099001 --stdout\n  cellpack payload fields --pretty"
)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on telemetry payloads.
    Payload {
        #[command(subcommand)]
        command: PayloadCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PayloadCommands {
    /// Decode a payload and write it as JSON.
    #[command(alias = "parse")]
    #[command(
        after_help = "Examples:\n  cellpack payload decode uplink.bin -o reading.json\n  cellpack payload decode uplink.hex --stdout --pretty\n  cellpack payload decode --hex 20050500000000000000c4099001 --stdout --raw"
    )]
    Decode {
        /// Path to a payload file (binary, or hex text for .hex/.txt)
        #[arg(required_unless_present = "hex")]
        input: Option<PathBuf>,

        /// Decode an inline hex payload instead of a file
        #[arg(long, conflicts_with = "input")]
        hex: Option<String>,

        /// How to read the input file
        #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
        format: InputFormat,

        /// Output path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write JSON to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Keep raw wire integers instead of scaled values
        #[arg(long)]
        raw: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// Print the sensor field catalog as JSON.
    Fields {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Auto,
    Binary,
    Hex,
}

impl From<InputFormat> for PayloadFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Auto => PayloadFormat::Auto,
            InputFormat::Binary => PayloadFormat::Binary,
            InputFormat::Hex => PayloadFormat::Hex,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Payload { command } => match command {
            PayloadCommands::Decode {
                input,
                hex,
                format,
                output,
                stdout,
                pretty,
                compact,
                raw,
                quiet,
            } => cmd_payload_decode(DecodeArgs {
                input,
                hex,
                format,
                output,
                stdout,
                pretty,
                compact,
                raw,
                quiet,
            }),
            PayloadCommands::Fields { pretty } => cmd_payload_fields(pretty),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "cellpack=debug,cellpack_core=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

#[derive(Debug)]
struct DecodeArgs {
    input: Option<PathBuf>,
    hex: Option<String>,
    format: InputFormat,
    output: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    raw: bool,
    quiet: bool,
}

fn cmd_payload_decode(args: DecodeArgs) -> Result<(), CliError> {
    let mode = if args.raw {
        ValueMode::Raw
    } else {
        ValueMode::Scaled
    };

    let (payload, input_path) = match (&args.hex, &args.input) {
        (Some(hex), _) => {
            let payload = cellpack_core::parse_hex_payload(hex).map_err(|err| {
                CliError::new(
                    format!("invalid --hex payload: {}", err),
                    Some("pass an even number of hex digits, e.g. 2005...".to_string()),
                )
            })?;
            (payload, None)
        }
        (None, Some(input)) => {
            let resolved = resolve_input_path(input)?;
            validate_input_file(&resolved)?;
            let payload = cellpack_core::load_payload_file(&resolved, args.format.into())
                .with_context(|| format!("Failed to read payload: {}", resolved.display()))?;
            (payload, Some(resolved))
        }
        (None, None) => {
            return Err(CliError::new(
                "missing input",
                Some("pass a payload file or --hex".to_string()),
            ));
        }
    };

    let output = if args.stdout {
        None
    } else {
        Some(args.output.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            )
        })?)
    };

    if let (Some(output), Some(input)) = (output.as_ref(), input_path.as_ref()) {
        ensure_distinct_paths(input, output)?;
    }

    debug!(bytes = payload.len(), ?mode, "decoding payload");
    let decoded = cellpack_core::decode_payload_with(&payload, mode).map_err(|err| {
        CliError::new(
            format!("payload decode failed: {}", err),
            Some("check the payload bytes and framing mode".to_string()),
        )
    })?;
    debug!(
        readings = decoded.reading_count,
        shared_mask = decoded.header.shared_presence_mask,
        interval_minutes = decoded.header.interval_minutes,
        "payload decoded"
    );
    let json = serialize_json(&decoded, args.pretty, args.compact)?;

    let Some(output) = output else {
        println!("{}", json);
        return Ok(());
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&output, json)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    if !args.quiet {
        print_summary(&decoded, &output);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldRow {
    flag: u8,
    name: &'static str,
    wire_type: &'static str,
    width: usize,
    scale: f64,
}

fn cmd_payload_fields(pretty: bool) -> Result<(), CliError> {
    let rows: Vec<FieldRow> = CATALOG
        .iter()
        .map(|descriptor| FieldRow {
            flag: descriptor.ordinal(),
            name: descriptor.name,
            wire_type: descriptor.wire_type.as_str(),
            width: descriptor.width(),
            scale: descriptor.scale,
        })
        .collect();
    println!("{}", serialize_json(&rows, pretty, false)?);
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_summary(decoded: &DecodedPayload, output: &Path) {
    eprintln!(
        "OK: decoded {} reading(s) -> {}",
        decoded.reading_count,
        output.display()
    );
}

fn ensure_distinct_paths(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let output_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(output_dir) = fs::canonicalize(output_dir) else {
        return Ok(());
    };
    let file_name = output
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path"))?;
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a binary payload file or a .hex text file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a binary payload file or a .hex text file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single payload file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
