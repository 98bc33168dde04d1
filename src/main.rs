//! Rowcast CLI - Transform CSV files into typed records
//!
//! # Main Commands
//!
//! ```bash
//! rowcast transform orders.csv --rules rules.json   # CSV to orders JSON
//! rowcast check rules.json                          # Compile a rule set
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! rowcast parse orders.csv          # Just parse CSV to row arrays
//! rowcast example-rules             # Show the standard orders rule set
//! ```

use clap::{Parser, Subcommand};
use rowcast::{
    decode_content, detect_delimiter, detect_encoding, read_rows, transform_file, CsvError, Order,
    RecordTransformer, RuleSet, TransformOptions,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowcast")]
#[command(about = "Transform CSV rows into typed records with a JSON rule set", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output rows as JSON arrays
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter, ASCII only (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline: CSV + rule set to orders JSON
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Rule set JSON file
        #[arg(short, long)]
        rules: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Transform rows on the rayon thread pool
        #[arg(long)]
        parallel: bool,

        /// Cap on failure reports shown (default: 10)
        #[arg(long, default_value = "10")]
        max_failures: usize,
    },

    /// Load and compile a rule set without transforming anything
    Check {
        /// Rule set JSON file
        rules: PathBuf,
    },

    /// Show the standard orders rule set
    ExampleRules,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Transform {
            input,
            rules,
            output,
            parallel,
            max_failures,
        } => cmd_transform(&input, &rules, output.as_deref(), parallel, max_failures),

        Commands::Check { rules } => cmd_check(&rules),

        Commands::ExampleRules => cmd_example_rules(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let bytes = fs::read(input)?;
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile.into());
    }

    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding)?;
    let used_delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let rows = read_rows(&content, used_delimiter)?;

    eprintln!("   Encoding: {}", encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(used_delimiter),
        if delimiter.is_none() {
            " (auto-detected)"
        } else {
            ""
        }
    );
    eprintln!("✅ Parsed {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_transform(
    input: &Path,
    rules_path: &Path,
    output: Option<&Path>,
    parallel: bool,
    max_failures: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let options = TransformOptions {
        parallel,
        max_failures,
    };

    let outcome = transform_file(input, rules_path, &options)?;

    eprintln!("   Encoding: {}", outcome.csv_info.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        format_delimiter(outcome.csv_info.delimiter)
    );
    eprintln!("   Rows: {}", outcome.csv_info.row_count);

    eprintln!("\n⚙️  Built {} orders", outcome.orders.len());

    if outcome.failure_count > 0 {
        eprintln!("\n⚠️  {} field(s) could not be built:", outcome.failure_count);
        for failure in &outcome.failures {
            eprintln!("   - {}", failure);
        }
        let shown = outcome.failures.len();
        if outcome.failure_count > shown {
            eprintln!("   ... and {} more", outcome.failure_count - shown);
        }
    }

    let json = serde_json::to_string_pretty(&outcome.orders)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_check(rules_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking rules: {}", rules_path.display());

    let rules = RuleSet::from_file(rules_path)?;
    RecordTransformer::<Order>::new(&rules)?;

    eprintln!("✅ {} rule(s) compile:", rules.transforms.len());
    for rule in &rules.transforms {
        eprintln!(
            "   {} → {} ({})",
            rule.value.template, rule.field, rule.value.name
        );
    }

    Ok(())
}

fn cmd_example_rules() -> Result<(), Box<dyn std::error::Error>> {
    let rules = rowcast::example_rules();
    println!("{}", rules.to_json()?);
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
