//! Demo command handler
//!
//! Exercises each backend in turn and prints what comes back. A failing
//! backend is reported and the demo moves on to the next one.

use crate::config::Config;
use crate::constants::api::RANDOM_ORG_KEY_ENV;
use crate::error::Result;
use crate::format::text::values_line;
use crate::provider::anu::AnuClient;
use crate::provider::ibm::IbmQuantumWrapper;
use crate::provider::random_org::{RandomOrgClient, RequestOptions};
use crate::provider::RandomValues;

const RULE: &str = "---------------------------------------";

/// Run the demo
///
/// Uses built-in defaults plus `RANDOM_ORG_API_KEY`; no config file is read.
pub async fn run() -> Result<()> {
    let config = Config::default();

    println!("{}", RULE);
    println!("Ask the Universe - Core RNG Engine");
    println!("A transparent and verifiable randomness generator");
    println!("{}", RULE);

    if let Err(e) = random_org(&config).await {
        eprintln!("\nError demonstrating Random.org API: {}", e);
    }

    if let Err(e) = anu(&config).await {
        eprintln!("\nError demonstrating ANU QRNG API: {}", e);
    }

    if let Err(e) = ibm(&config).await {
        eprintln!("\nError demonstrating IBM Quantum: {}", e);
        println!("This could be due to missing Python dependencies.");
        println!("Try installing them with: ask-the-universe provision");
    }

    println!("\n{}", RULE);
    println!("Demo completed.");
    println!("{}", RULE);

    Ok(())
}

async fn random_org(config: &Config) -> Result<()> {
    println!("\nDemonstrating Random.org API client:");
    println!("(Note: You need to set a valid API key to run this example)");

    let Some(api_key) = config.random_org_api_key() else {
        println!("\nPlease set your Random.org API key to run this demo.");
        println!("You can get a free API key at https://api.random.org/");
        println!("Set it in the environment variable {}.", RANDOM_ORG_KEY_ENV);
        return Ok(());
    };

    let client = RandomOrgClient::with_timeout(api_key, config.http_timeout())?
        .with_endpoint(&config.endpoints.random_org);

    println!("\nGenerating 5 random integers between 1 and 100...");
    let result = client
        .generate_integers(5, 1, 100, &RequestOptions::default())
        .await?;

    let integers = result
        .random
        .data
        .iter()
        .map(|v| v.to_i64(10))
        .collect::<Result<Vec<_>>>()?;

    println!("\nResults:");
    println!("Random integers: {}", values_line(&RandomValues::Integers(integers)));
    println!("Completion time: {}", result.random.completion_time);
    println!("\nAPI Quota Information:");
    println!("Bits used: {}", result.bits_used);
    println!("Bits left: {}", result.bits_left);
    println!("Requests left: {}", result.requests_left);
    println!("Advisory delay (ms): {}", result.advisory_delay);

    Ok(())
}

async fn anu(config: &Config) -> Result<()> {
    println!("\nDemonstrating ANU Quantum Random Number Generator API client:");
    println!("(No API key required for this service)");

    let client = AnuClient::with_timeout(config.http_timeout())?;

    println!("\nGenerating 10 random uint8 values (0-255)...");
    let uint8 = client.generate_uint8(10).await?;
    println!("Random uint8 values: {}", values_line(&RandomValues::Bytes(uint8)));

    println!("\nGenerating 5 random uint16 values (0-65535)...");
    let uint16 = client.generate_uint16(5).await?;
    println!("Random uint16 values: {:?}", uint16);

    println!("\nGenerating 3 random hex16 values...");
    let hex16 = client.generate_hex16(3).await?;
    println!("Random hex16 values: {}", hex16.join(", "));

    Ok(())
}

async fn ibm(config: &Config) -> Result<()> {
    println!("\nDemonstrating IBM Quantum Random Number Generator:");
    println!("(Using local simulator - no API key required)");

    let wrapper = IbmQuantumWrapper::from_config(&config.simulator);

    println!("\nGenerating 8 random bits using IBM Quantum simulator...");
    let bits = wrapper.generate_random_bits(8).await?;

    println!("\nResults:");
    println!("Random bitstring: {}", bits.bitstring);
    if let Some(integer) = bits.integer {
        println!("Random integer (0-255): {}", integer);
    }
    println!("Backend used: {}", bits.backend);

    println!("\nGenerating 4 random bytes...");
    let bytes = wrapper.get_random_bytes(4).await?;
    println!("Random bytes array: {}", values_line(&RandomValues::Bytes(bytes)));

    Ok(())
}
