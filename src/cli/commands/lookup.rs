use crate::config::Config;
use crate::domain::CallerId;
use crate::services::{DiscoveryError, DiscoveryRequest};
use crate::state::SharedState;

const CLI_CALLER: &str = "cli";

pub async fn cmd_lookup(config: Config, name: &str, json: bool) -> anyhow::Result<()> {
    let threshold = config.search.confidence_threshold;
    let state = SharedState::new(config).await?;

    let request = DiscoveryRequest::new(name, CallerId::new(CLI_CALLER));
    let outcome = match state.discovery.discover(request).await {
        Ok(outcome) => outcome,
        Err(DiscoveryError::InvalidInput { .. }) => {
            println!("Company name must be at least 2 characters.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.results.is_empty() {
        println!("No LinkedIn company pages found for '{}'.", outcome.search_term);
        return Ok(());
    }

    let origin = if outcome.cached {
        "cache".to_string()
    } else {
        outcome.provider.unwrap_or("unknown").to_string()
    };

    println!("Results for '{}' (from {origin}):", outcome.search_term);
    println!("{:-<70}", "");

    for result in &outcome.results {
        let marker = if result.source.is_guess() {
            "?"
        } else if result.confidence >= threshold {
            "✓"
        } else {
            "•"
        };
        println!(
            "{marker} {:.2}  {}  {}",
            result.confidence, result.company_name, result.url
        );
        if !result.description.is_empty() {
            println!("        {}", result.description);
        }
    }

    Ok(())
}
