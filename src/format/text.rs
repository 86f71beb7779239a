//! Human-readable text output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::provider::{RandomResult, RandomValues};

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

/// Render values on one line
pub fn values_line(values: &RandomValues) -> String {
    fn join<T: ToString>(items: &[T]) -> String {
        items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    }

    match values {
        RandomValues::Integers(v) => join(v),
        RandomValues::Decimals(v) => join(v),
        RandomValues::Bytes(v) => join(v),
        RandomValues::Uuids(v) => join(v),
        RandomValues::BitString(s) => s.clone(),
    }
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, result: &RandomResult) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("Backend: {}\n", result.backend));
        output.push_str(&format!("Values: {}\n", values_line(&result.values)));
        output.push_str(&format!("Completion time: {}\n", result.completed_at));

        if let Some(quota) = &result.quota {
            output.push_str("\nAPI Quota Information:\n");
            output.push_str(&format!("  Bits used: {}\n", quota.bits_used));
            output.push_str(&format!("  Bits left: {}\n", quota.bits_left));
            output.push_str(&format!("  Requests left: {}\n", quota.requests_left));
            output.push_str(&format!("  Advisory delay (ms): {}\n", quota.advisory_delay_ms));
        }

        Ok(output)
    }
}
