//! `roster-scout discover` and `roster-scout rebuild`.

use crate::cli::output::{self, Styled};
use crate::config::ScoutConfig;
use crate::discovery::{AssociationFilter, Discoverer, Discovery, DiscoveryRequest};
use anyhow::Result;
use clap::Args;

/// Arguments shared by `discover`, `rebuild` and `matches`.
#[derive(Args, Debug, Clone)]
pub struct DiscoverArgs {
    /// Sport, e.g. "baseball" or "womens soccer"
    #[arg(long, default_value = "mens basketball")]
    pub sport: String,
    /// Region: west, midwest, south, northeast (or a synonym like "pnw")
    #[arg(long)]
    pub region: Option<String>,
    /// Comma-separated state codes; overrides --region
    #[arg(long, value_delimiter = ',')]
    pub states: Vec<String>,
    /// Comma-separated sources (governing, vendors, wiki)
    #[arg(long)]
    pub sources: Option<String>,
    /// Keep NCAA Division III programs
    #[arg(long)]
    pub include_diii: bool,
    /// Keep NJCAA programs
    #[arg(long)]
    pub include_njcaa: bool,
    /// Cache TTL override in hours
    #[arg(long)]
    pub cache_hours: Option<f64>,
}

impl DiscoverArgs {
    pub fn filter(&self) -> AssociationFilter {
        AssociationFilter::new(self.include_diii, self.include_njcaa)
    }

    pub fn states(&self) -> Option<Vec<String>> {
        (!self.states.is_empty()).then(|| self.states.clone())
    }

    pub fn to_request(&self, diagnostics: bool) -> DiscoveryRequest {
        DiscoveryRequest {
            sport: Some(self.sport.clone()),
            region: self.region.clone(),
            states: self.states(),
            sources: self.sources.clone(),
            filter: self.filter(),
            cache_hours: self.cache_hours,
            diagnostics,
        }
    }
}

/// Run the discover command.
pub async fn run(args: &DiscoverArgs, diag: bool) -> Result<()> {
    let discoverer = Discoverer::from_config(&ScoutConfig::load()?);
    let result = discoverer.discover(&args.to_request(diag)).await?;
    report(&result)
}

/// Run the rebuild command: discovery with the cache bypassed.
pub async fn run_rebuild(args: &DiscoverArgs, diag: bool) -> Result<()> {
    let discoverer = Discoverer::from_config(&ScoutConfig::load()?);
    let result = discoverer.rebuild(&args.to_request(diag)).await?;
    report(&result)
}

fn report(result: &Discovery) -> Result<()> {
    if output::is_json() {
        output::print_json(&serde_json::to_value(result)?);
        return Ok(());
    }
    if output::is_quiet() {
        for p in result.programs() {
            println!("{}", p.roster_url);
        }
        return Ok(());
    }

    let s = Styled::new();
    let payload = &result.payload;
    eprintln!(
        "  {} {} program(s) across {} state(s) [{}]",
        s.ok_sym(),
        result.count,
        payload.states.len(),
        payload.sport_slugs.join(", ")
    );
    eprintln!();
    for p in result.programs() {
        let tier = match p.division {
            Some(d) => format!("{} {d}", p.association),
            None => p.association.to_string(),
        };
        println!("  [{}] {} {}", p.state, s.bold(&p.school), s.dim(&format!("({tier})")));
        println!("       roster: {}", p.roster_url);
    }

    if let Some(trace) = &payload.diag {
        eprintln!();
        for t in trace {
            let sym = if t.ok { s.ok_sym() } else { s.warn_sym() };
            eprintln!(
                "  {sym} {} {} candidates {}",
                t.state,
                t.candidates,
                s.dim(t.error.as_deref().unwrap_or(""))
            );
        }
    }
    Ok(())
}
