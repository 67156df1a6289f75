use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docmark::config::Config;
use docmark::watermark::{download_filename, DeliveryKind, WatermarkProcessor};
use std::path::{Path, PathBuf};

/// Docmark - stamp PDFs with a tiled, masked identifier of their reader
#[derive(Parser, Debug)]
#[command(name = "docmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark a PDF
    Apply {
        /// Source PDF (left untouched)
        #[arg(short, long)]
        input: PathBuf,

        /// Identifier of the reader, e.g. a CPF; non-digits are ignored
        #[arg(short = 'n', long)]
        identifier: String,

        /// Output file; "-" writes to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report number used to name the output when --output is omitted
        #[arg(long)]
        report_number: Option<String>,

        /// Delivery route used to name the output
        #[arg(long, default_value_t = DeliveryKind::View)]
        delivery: DeliveryKind,
    },

    /// Print the per-page watermark layout as JSON without writing a PDF
    Plan {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short = 'n', long)]
        identifier: String,
    },

    /// Validate the configuration and exit
    CheckConfig,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    Ok(config)
}

fn output_path(
    input: &Path,
    output: Option<PathBuf>,
    report_number: Option<&str>,
    delivery: DeliveryKind,
) -> PathBuf {
    if let Some(output) = output {
        return output;
    }

    let number = match report_number {
        Some(number) => number.to_string(),
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "documento".to_string()),
    };
    let name = download_filename(&number, delivery);

    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Whether `target` resolves to the same file as `input`, through `..`
/// segments and symlinks included.
fn is_same_file(input: &Path, target: &Path) -> bool {
    if input == target {
        return true;
    }
    // A target that does not exist yet cannot be the source.
    match (std::fs::canonicalize(input), std::fs::canonicalize(target)) {
        (Ok(input), Ok(target)) => input == target,
        _ => false,
    }
}

fn run(args: Args, config: Config) -> Result<()> {
    match args.command {
        Command::Apply {
            input,
            identifier,
            output,
            report_number,
            delivery,
        } => {
            let processor = WatermarkProcessor::new(config.watermark)?;
            let target = output_path(&input, output, report_number.as_deref(), delivery);
            if target.as_os_str() != "-" && is_same_file(&input, &target) {
                bail!("Refusing to overwrite the source document {}", input.display());
            }

            let stamped = processor
                .watermark_file(&input, &identifier)
                .with_context(|| format!("Failed to watermark {}", input.display()))?;

            if target.as_os_str() == "-" {
                use std::io::Write;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&stamped.bytes)?;
                stdout.flush()?;
            } else {
                std::fs::write(&target, &stamped.bytes)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
            }

            tracing::info!(
                input = %input.display(),
                output = %target.display(),
                pages = stamped.page_count,
                delivery = %delivery,
                "Watermarked document written"
            );
        }
        Command::Plan { input, identifier } => {
            let processor = WatermarkProcessor::new(config.watermark)?;
            let plan = processor
                .plan_file(&input, &identifier)
                .with_context(|| format!("Failed to plan {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::CheckConfig => {
            println!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("{:#}", e);
        std::process::exit(2);
    });

    // Initialize logging subsystem
    if let Err(e) = docmark::logging::init_subscriber(&config.logging) {
        eprintln!("Failed to initialize logging subsystem: {}", e);
        std::process::exit(2);
    }

    tracing::debug!(
        config_file = ?args.config,
        font = %config.watermark.style.font,
        opacity = config.watermark.style.opacity,
        "Configuration loaded successfully"
    );

    if let Err(e) = run(args, config) {
        tracing::error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
