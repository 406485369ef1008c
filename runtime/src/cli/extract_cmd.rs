//! `roster-scout extract <url>`: pull players off one roster page.

use crate::cli::output::{self, Styled};
use crate::config::ScoutConfig;
use crate::extraction::RosterExtractor;
use anyhow::Result;

/// Run the extract command.
pub async fn run(url: &str) -> Result<()> {
    let extractor = RosterExtractor::from_config(&ScoutConfig::load()?);
    let extraction = extractor.extract_roster(url).await?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&extraction)?);
        return Ok(());
    }

    let s = Styled::new();
    if extraction.players.is_empty() {
        if !output::is_quiet() {
            eprintln!("  {} No players found at {url}", s.warn_sym());
        }
        return Ok(());
    }

    if !output::is_quiet() {
        eprintln!(
            "  {} {}: {} player(s)",
            s.ok_sym(),
            s.bold(&extraction.name),
            extraction.players.len()
        );
        eprintln!();
    }
    for p in &extraction.players {
        if p.position.is_empty() {
            println!("  {}", p.name);
        } else {
            println!("  {:<32} {}", p.name, s.dim(&p.position));
        }
    }
    Ok(())
}
