use serde_json::Value;

use super::cell;

/// Print only the headline answer: `<overall> <risk>` for a scored offering,
/// one such line per offering for a batch.
pub fn print_minimal(value: &Value) {
    if let Some(Value::Array(results)) = value.get("results") {
        for row in results {
            println!("{}", headline(row));
        }
        return;
    }

    let result = value.get("result").unwrap_or(value);
    println!("{}", headline(result));
}

fn headline(result: &Value) -> String {
    match (result.get("overallScore"), result.get("riskLevel")) {
        (Some(score), Some(risk)) => format!("{} {}", cell(score), cell(risk)),
        (Some(score), None) => cell(score),
        _ => cell(result),
    }
}
