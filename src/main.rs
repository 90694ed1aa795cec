// Command line driver: loads a catalog and an occupancy list, runs the
// automatic selection, applies manual overrides and prints a JSON report

use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use tracing::{info, Level};

use room_rate_engine::{
    load_catalog, load_config, load_occupancies, AllocationSession, EngineConfig, RankedResult,
};

#[derive(Debug, Parser)]
#[command(
    name = "room-rates",
    about = "Allocate and rank room rates for a multi-room booking"
)]
struct Args {
    /// Catalog JSON path (bare catalog or hub response envelope).
    #[arg(long)]
    catalog: PathBuf,

    /// Occupancy list JSON path.
    #[arg(long)]
    occupancy: PathBuf,

    /// Engine config JSON path (defaults apply when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Manual selection `index:recommendationId:rateId`, applied in order.
    #[arg(long = "override", value_name = "SELECTION")]
    overrides: Vec<OverrideArg>,

    /// Log engine decisions per room.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct OverrideArg {
    index: usize,
    recommendation_id: String,
    rate_id: String,
}

impl FromStr for OverrideArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(index), Some(recommendation_id), Some(rate_id)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected index:recommendationId:rateId, got `{s}`"));
        };
        if recommendation_id.is_empty() || rate_id.is_empty() {
            return Err(format!("empty id in `{s}`"));
        }
        let index = index
            .parse()
            .map_err(|_| format!("room index must be a non-negative integer, got `{index}`"))?;

        Ok(Self {
            index,
            recommendation_id: recommendation_id.to_string(),
            rate_id: rate_id.to_string(),
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let catalog = load_catalog(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
    let occupancies = load_occupancies(&args.occupancy)
        .with_context(|| format!("loading occupancies {}", args.occupancy.display()))?;
    let config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    info!(
        rates = catalog.rates.len(),
        recommendations = catalog.recommendations.len(),
        rooms = occupancies.len(),
        "documents loaded"
    );

    let mut session = AllocationSession::auto_select(&catalog, &occupancies, config)
        .context("automatic selection failed")?;
    for selection in &args.overrides {
        session
            .override_selection(selection.index, &selection.recommendation_id, &selection.rate_id)
            .with_context(|| {
                format!(
                    "override {}:{}:{} failed",
                    selection.index, selection.recommendation_id, selection.rate_id
                )
            })?;
    }

    println!("{}", serde_json::to_string_pretty(&report(&session))?);
    Ok(())
}

fn report(session: &AllocationSession) -> Value {
    let rooms: Vec<Value> = session
        .occupancies()
        .iter()
        .zip(session.results())
        .zip(session.selections())
        .enumerate()
        .map(|(index, ((occupancy, ranked), selection))| {
            json!({
                "room": index,
                "occupancy": occupancy,
                "selection": selection,
                "groups": groups(session, ranked),
            })
        })
        .collect();

    json!({
        "rooms": rooms,
        "lockedRates": session.locked_rates(),
    })
}

// Ranked groups decorated with the standardized room name, when known
fn groups(session: &AllocationSession, ranked: &RankedResult) -> Vec<Value> {
    ranked
        .groups()
        .iter()
        .map(|group| {
            let name = session
                .catalog()
                .standardized_room(&group.std_room_id)
                .map(|room| room.name.as_str());
            json!({
                "stdRoomId": group.std_room_id,
                "name": name,
                "entries": group.entries,
            })
        })
        .collect()
}
