//! `roster-scout matches`: rank discovered programs for a recruit.

use crate::cli::discover_cmd::DiscoverArgs;
use crate::cli::output::{self, Styled};
use crate::config::ScoutConfig;
use crate::discovery::Discoverer;
use crate::extraction::RosterExtractor;
use crate::matching::{run_matches, MatchRequest};
use anyhow::{bail, Result};

/// Run the matches command.
pub async fn run(
    args: &DiscoverArgs,
    position: &str,
    class_level: &str,
    debug: bool,
) -> Result<()> {
    let config = ScoutConfig::load()?;
    let discoverer = Discoverer::from_config(&config);
    let extractor = RosterExtractor::from_config(&config);

    let req = MatchRequest {
        sport: args.sport.clone(),
        position: position.to_string(),
        class_level: class_level.to_string(),
        region: args.region.clone(),
        states: args.states(),
        debug,
    };
    let report = run_matches(&discoverer, &extractor, &req, args.filter(), args.cache_hours).await?;

    if report.discovery.count == 0 {
        bail!("Could not discover roster URLs for that sport/region.");
    }
    if report.results.is_empty() {
        bail!("No valid roster pages parsed for that sport/region.");
    }

    if output::is_json() {
        output::print_json(&serde_json::to_value(&report)?);
        return Ok(());
    }

    let s = Styled::new();
    if !output::is_quiet() {
        eprintln!(
            "  {} {} match(es) from {} program(s)",
            s.ok_sym(),
            report.count,
            report.discovery.count
        );
        eprintln!();
    }
    for (rank, m) in report.results.iter().enumerate() {
        println!(
            "  {:>3}. {:>5.1}  {} [{}] {}",
            rank + 1,
            m.final_score,
            s.bold(&m.school),
            m.state,
            s.dim(&format!(
                "propensity {:.3}, {} considered",
                m.propensity, m.players_considered
            ))
        );
    }
    Ok(())
}
