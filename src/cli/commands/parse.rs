//! Parse command implementation.

use crate::core::parser::parse_with_rule;
use crate::Result;
use colored::Colorize;

/// Parse filenames locally and print what was recognised.
pub fn parse_names(names: &[String], json: bool) -> Result<()> {
    if json {
        let results: Vec<_> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "input": name,
                    "parsed": parse_with_rule(name).map(|(_, parsed)| parsed),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for name in names {
        match parse_with_rule(name) {
            Some((rule, parsed)) => {
                let kind = if parsed.is_series() { "series" } else { "movie" };
                println!("{} {}", "[OK]".green(), name);
                println!("  {} {}", "Parsed:".bold(), parsed);
                println!("  {} {} ({:?})", "Type:".bold(), kind, rule);
            }
            None => println!("{} {}: could not parse", "[FAIL]".red(), name),
        }
    }

    Ok(())
}
