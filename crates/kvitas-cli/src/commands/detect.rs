//! Detect command - report which retailer issued a receipt.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use kvitas_core::ReceiptProcessor;

use super::{load_config, read_input};

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Input receipt text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// List the signatures tried, in detection order
    #[arg(long)]
    list_signatures: bool,
}

pub async fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let processor = ReceiptProcessor::from_config(&config);

    if args.list_signatures {
        for (i, signature) in processor.detector().signatures().iter().enumerate() {
            eprintln!(
                "  {}. {} {}",
                i + 1,
                style(signature.retailer).cyan(),
                style(format!("{:?}", signature.marker)).dim()
            );
        }
    }

    let text = read_input(&args.input)?;
    let retailer = processor.detect(&text)?;
    info!("Detected {} in {}", retailer, args.input.display());

    println!("{}", retailer);

    Ok(())
}
