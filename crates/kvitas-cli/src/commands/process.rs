//! Process command - parse a single receipt file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use kvitas_core::{KvitasConfig, ParsedReceipt, ReceiptProcessor};

use super::{load_config, read_input};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input receipt text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from configuration)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Show processing time and extraction warnings
    #[arg(long)]
    show_stats: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per product
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// Format named by `output.format` in the configuration.
    pub fn from_config(config: &KvitasConfig) -> anyhow::Result<Self> {
        match config.output.format.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" => Ok(Self::Text),
            other => anyhow::bail!("Unsupported output format in configuration: {}", other),
        }
    }

    /// Resolve an optional command line choice against the configuration.
    pub fn resolve(choice: Option<Self>, config: &KvitasConfig) -> anyhow::Result<Self> {
        choice.map_or_else(|| Self::from_config(config), Ok)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let format = OutputFormat::resolve(args.format, &config)?;

    info!("Processing receipt: {}", args.input.display());
    let text = read_input(&args.input)?;

    let processor = ReceiptProcessor::from_config(&config);
    let result = processor.parse(&text)?;

    let pretty = args.pretty || config.output.pretty;
    let output = format_receipt(&result.receipt, format, pretty, config.output.show_receipt_lines)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.show_stats {
        eprintln!();
        eprintln!(
            "{} {} receipt, {} products from {} lines",
            style("ℹ").blue(),
            result.receipt.retailer,
            result.receipt.products.len(),
            result.line_count
        );
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render a parsed receipt in the requested format.
pub fn format_receipt(
    receipt: &ParsedReceipt,
    format: OutputFormat,
    pretty: bool,
    show_receipt_lines: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Json => Ok(serde_json::to_string(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt, show_receipt_lines)),
    }
}

fn format_csv(receipt: &ParsedReceipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "retailer",
        "date",
        "name",
        "full",
        "discount",
        "paid",
        "quantity",
        "unit",
        "receipt_line",
    ])?;

    let retailer = receipt.retailer.to_string();
    let date = receipt.date.to_string();
    for product in &receipt.products {
        let (amount, unit) = product
            .quantity
            .as_ref()
            .map(|q| (q.amount.to_string(), q.unit.to_string()))
            .unwrap_or_default();

        wtr.write_record([
            retailer.as_str(),
            date.as_str(),
            product.name.as_str(),
            &product.price.full.to_string(),
            &product.price.discount.to_string(),
            &product.price.paid.to_string(),
            &amount,
            &unit,
            product.receipt_line.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &ParsedReceipt, show_receipt_lines: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Retailer: {}\n", receipt.retailer));
    output.push_str(&format!("Date: {}\n", receipt.date));
    output.push('\n');

    output.push_str(&format!("Products ({}):\n", receipt.products.len()));
    for product in &receipt.products {
        let quantity = product
            .quantity
            .as_ref()
            .map(|q| format!(" [{} {}]", q.amount, q.unit))
            .unwrap_or_default();
        output.push_str(&format!("  {}{}\n", product.name, quantity));

        if product.price.discount.is_zero() {
            output.push_str(&format!("    Paid: {} EUR\n", product.price.paid));
        } else {
            output.push_str(&format!(
                "    Paid: {} EUR (full {}, discount {})\n",
                product.price.paid, product.price.full, product.price.discount
            ));
        }

        if show_receipt_lines {
            output.push_str(&format!("    Line: {}\n", product.receipt_line));
        }
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Full:     {} EUR\n", receipt.total_full()));
    output.push_str(&format!("  Discount: {} EUR\n", receipt.total_discount()));
    output.push_str(&format!("  Paid:     {} EUR\n", receipt.total_paid()));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvitas_core::parse_receipt;

    const BARBORA: &str = "Barbora
2023-04-16
1 Nektarinai, 1 kg 0.612 kg €1.6569 €1.3693 21,00 €0.84 €1.01
2 Užtepėlė 1 pak. €1.2900 €1.0661 21,00 €0.22 €1.29
Pritaikytos nuolaidos
Nektarinai, 1 kg -€1.10";

    #[test]
    fn test_format_csv() {
        let receipt = parse_receipt(BARBORA).unwrap();
        let csv = format_csv(&receipt).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("retailer,date,name,"));
        assert!(lines[1].starts_with("barbora,2023-04-16,\"Nektarinai, 1 kg\",2.11,1.10,1.01,612,grams,"));
        assert!(lines[2].starts_with("barbora,2023-04-16,Užtepėlė,1.29,0,1.29,,,"));
    }

    #[test]
    fn test_format_text() {
        let receipt = parse_receipt(BARBORA).unwrap();
        let text = format_text(&receipt, true);

        assert!(text.contains("Retailer: barbora\n"));
        assert!(text.contains("  Nektarinai, 1 kg [612 grams]\n"));
        assert!(text.contains("    Paid: 1.01 EUR (full 2.11, discount 1.10)\n"));
        assert!(text.contains("    Paid: 1.29 EUR\n"));
        assert!(text.contains("  Paid:     2.30 EUR\n"));
        assert!(text.contains("    Line: 2 Užtepėlė"));
    }

    #[test]
    fn test_output_format_from_config() {
        let mut config = KvitasConfig::default();
        assert_eq!(OutputFormat::resolve(None, &config).unwrap(), OutputFormat::Json);

        config.output.format = "text".to_string();
        assert_eq!(OutputFormat::resolve(None, &config).unwrap(), OutputFormat::Text);
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Csv), &config).unwrap(),
            OutputFormat::Csv
        );

        config.output.format = "xml".to_string();
        assert!(OutputFormat::from_config(&config).is_err());
    }
}
