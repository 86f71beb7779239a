//! Backends command handler
//!
//! Lists every backend with the kinds of values it can produce.

use crate::error::Result;
use crate::provider::available_backends;

/// Run the backends command
pub fn run() -> Result<()> {
    println!("Available backends:");
    for backend in available_backends() {
        let kinds: Vec<String> = backend.kinds.iter().map(|k| k.to_string()).collect();
        println!("  {:10} - {}", backend.name, backend.description);
        println!("  {:10}   kinds: {}", "", kinds.join(", "));
    }
    Ok(())
}
