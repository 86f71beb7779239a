//! Generate command handler
//!
//! Builds a request from the arguments and sends it to one backend.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::provider::{Provider, RandomRequest, RandomnessProvider};
use clap::{Args, ValueEnum};

/// Kind of values to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Integer,
    Decimal,
    Bytes,
    Uuid,
    Bitstring,
}

/// Generate command arguments
#[derive(Args)]
pub struct GenerateArgs {
    /// Backend: random_org, anu or ibm
    #[arg(long, short = 'b')]
    pub backend: Option<String>,

    /// Kind of values
    #[arg(long, short = 'k', value_enum, default_value_t = KindArg::Integer)]
    pub kind: KindArg,

    /// Number of values (bits for bitstring)
    #[arg(long, short = 'n', default_value = "1")]
    pub count: usize,

    /// Lower bound for integers (inclusive)
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    pub min: i64,

    /// Upper bound for integers (inclusive)
    #[arg(long, default_value = "100", allow_negative_numbers = true)]
    pub max: i64,

    /// Decimal places for decimals
    #[arg(long, default_value = "4")]
    pub places: u8,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

impl GenerateArgs {
    /// The backend-neutral request these arguments describe
    pub fn request(&self) -> RandomRequest {
        match self.kind {
            KindArg::Integer => RandomRequest::Integers {
                count: self.count,
                min: self.min,
                max: self.max,
            },
            KindArg::Decimal => RandomRequest::Decimals {
                count: self.count,
                places: self.places,
            },
            KindArg::Bytes => RandomRequest::Bytes { count: self.count },
            KindArg::Uuid => RandomRequest::Uuids { count: self.count },
            KindArg::Bitstring => RandomRequest::BitString { bits: self.count },
        }
    }
}

/// Run the generate command
pub async fn run(args: GenerateArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;

    let backend_name = args.backend.clone().unwrap_or(config.defaults.backend.clone());
    let format = args.format.clone().unwrap_or(config.defaults.format.clone());

    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
    let provider = Provider::from_config(&backend_name, &config)?;

    let result = provider.produce(&args.request()).await?;
    println!("{}", formatter.format(&result)?);

    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
