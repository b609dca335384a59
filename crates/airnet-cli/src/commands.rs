//! Subcommand definitions and their handlers.

use airnet_core::models::normalize_code;
use airnet_core::{
    aggregate_market_totals, build_market_quarterly, carrier_directory, compute_concentration,
    equipment_usage, market_stability, network_summary, rank_markets, ranked_routes,
    route_economics, simulate, CbsaMatcher, CompetitionIndex, DemandRecord, EconomicsAssumptions,
    FleetRules, FleetSpec, MarketQuarter, NetworkSummary, OptimalAircraftRanker, PeerClass, RouteScore,
    ScoreEngine, StabilityThresholds, SuggestionLimits,
};
use airnet_data::DataSnapshot;
use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;

use crate::fleet_arg::parse_fleet;
use crate::output::{fixed, grouped, label, optional, write_json, Table};

/// Airline network planning from published schedule data
#[derive(Parser, Debug)]
#[command(name = "airnet", author, version, about)]
pub struct Cli {
    /// Directory holding segments.csv, cbsa.csv, airports.csv and the optional files
    #[arg(long, env = "AIRNET_DATA_DIR", default_value = "./data", global = true)]
    pub data_dir: PathBuf,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List carriers with route counts
    Carriers {
        /// Case-insensitive substring of the carrier code
        #[arg(long)]
        query: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Summarize a carrier's network
    Network {
        carrier: String,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// List carrier groups, or summarize one group's pooled network
    CarrierGroups {
        /// Group code; omit to list every group
        code: Option<u32>,
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Rough per-route profit under flat unit assumptions
    Economics {
        carrier: String,
        #[arg(long)]
        casm: Option<f64>,
        #[arg(long)]
        load_factor: Option<f64>,
        #[arg(long)]
        yield_per_rpm: Option<f64>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Score every route of a carrier
    Scores {
        carrier: String,
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },
    /// Strongest metro-to-metro corridors of a carrier
    Corridors {
        carrier: String,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Propose unflown airport pairs inside the top corridors
    Suggest {
        carrier: String,
        /// Corridors to expand
        #[arg(long, default_value_t = 3)]
        corridors: usize,
        /// Suggestions kept per corridor
        #[arg(long, default_value_t = 10)]
        max_suggestions: usize,
        /// Airport pairs examined per corridor before giving up
        #[arg(long, default_value_t = 250_000)]
        candidate_cap: usize,
    },
    /// Simulate one day of fleet assignment over a carrier's routes
    Assign(AssignArgs),
    /// Rank the carrier's aircraft types for a route
    RankAircraft(RankArgs),
    /// O&D passenger demand analysis (needs demand.csv)
    Demand {
        #[command(flatten)]
        scope: DemandScope,
        #[command(subcommand)]
        view: DemandView,
    },
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    pub carrier: String,
    /// TYPE:COUNT[:SEATS[:RANGE_MI]] entries, comma separated
    #[arg(long)]
    pub fleet: String,
    /// Schedule only the top N routes by ASM
    #[arg(long)]
    pub route_limit: Option<usize>,
    #[arg(long)]
    pub day_hours: Option<f64>,
    #[arg(long)]
    pub maintenance_hours: Option<f64>,
    #[arg(long)]
    pub crew_max_hours: Option<f64>,
}

impl AssignArgs {
    pub fn rules(&self) -> FleetRules {
        let defaults = FleetRules::default();
        FleetRules {
            day_hours: self.day_hours.unwrap_or(defaults.day_hours),
            maintenance_hours: self.maintenance_hours.unwrap_or(defaults.maintenance_hours),
            crew_max_hours: self.crew_max_hours.unwrap_or(defaults.crew_max_hours),
            ..defaults
        }
    }
}

#[derive(Args, Debug)]
pub struct RankArgs {
    pub carrier: String,
    /// Route length in statute miles
    #[arg(long, conflicts_with_all = ["source", "destination"])]
    pub distance: Option<f64>,
    #[arg(long, requires = "destination")]
    pub source: Option<String>,
    #[arg(long, requires = "source")]
    pub destination: Option<String>,
    #[arg(long)]
    pub seat_demand: Option<u32>,
    #[arg(long, default_value_t = 3)]
    pub top: usize,
    /// legacy, low_cost, ultra_low_cost or regional; inferred when omitted
    #[arg(long)]
    pub peer_class: Option<String>,
}

#[derive(Args, Debug)]
pub struct DemandScope {
    /// Keep origin and destination apart instead of pooling both directions
    #[arg(long)]
    pub directional: bool,
    /// Ignore quarters before this year
    #[arg(long)]
    pub since_year: Option<i32>,
}

#[derive(Subcommand, Debug)]
pub enum DemandView {
    /// Busiest markets by total passengers
    TopMarkets {
        #[arg(long, default_value_t = 50)]
        top: usize,
        /// Airports to leave out, comma separated
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
    },
    /// Share of traffic carried by the busiest markets
    Concentration {
        #[arg(long, default_value_t = 0.10)]
        top_share: f64,
    },
    /// Classify markets by quarter-to-quarter stability
    Stability {
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        stable_residual_cv_max: Option<f64>,
        #[arg(long)]
        stable_seasonality_max: Option<f64>,
        #[arg(long)]
        seasonal_seasonality_min: Option<f64>,
        #[arg(long)]
        seasonal_residual_cv_max: Option<f64>,
    },
}

fn known_carrier(snapshot: &DataSnapshot, raw: &str) -> Result<String> {
    let code = normalize_code(raw).ok_or_else(|| anyhow!("carrier code must not be blank"))?;
    if !snapshot.aggregation.has_carrier(&code) {
        bail!("carrier {code} has no routes in the loaded data; try `airnet carriers`");
    }
    Ok(code)
}

fn write_network(out: &mut dyn Write, summary: &NetworkSummary) -> Result<()> {
    writeln!(
        out,
        "{}: {} routes ({} with ASM), {} airports, {} seats, {} ASM",
        summary.carrier,
        summary.total_routes,
        summary.valid_routes,
        summary.airports_served,
        grouped(summary.total_seats),
        grouped(summary.total_asm),
    )?;
    writeln!(
        out,
        "distance mean {} mi, max {} mi",
        grouped(summary.mean_distance_miles),
        grouped(summary.max_distance_miles)
    )?;
    let hubs: Vec<String> = summary
        .top_hubs
        .iter()
        .map(|h| format!("{} ({})", h.airport, h.degree))
        .collect();
    writeln!(out, "hubs: {}", hubs.join(", "))?;
    let equipment: Vec<String> = summary
        .top_equipment
        .iter()
        .map(|e| format!("{} ({})", e.equipment, e.routes))
        .collect();
    writeln!(out, "equipment: {}", equipment.join(", "))?;
    for (title, rows) in [
        ("domestic", &summary.top_domestic_routes),
        ("international", &summary.top_international_routes),
    ] {
        if rows.is_empty() {
            continue;
        }
        writeln!(out, "\ntop {title} routes")?;
        let mut table = Table::new(["route", "equipment", "seats", "miles", "asm"]);
        for r in rows {
            table.row([
                format!("{}-{}", r.source, r.destination),
                r.equipment.clone().unwrap_or_else(|| "-".to_string()),
                grouped(r.seats),
                grouped(r.distance_miles),
                grouped(r.asm),
            ]);
        }
        table.write_to(out)?;
    }
    Ok(())
}

/// Execute one subcommand against a loaded snapshot.
pub fn run(command: &Command, snapshot: &DataSnapshot, json: bool, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Carriers { query, limit } => {
            let carriers = carrier_directory(&snapshot.aggregation, query.as_deref(), *limit);
            if json {
                return write_json(out, &carriers);
            }
            let mut table = Table::new(["carrier", "routes", "seats"]);
            for c in &carriers {
                table.row([c.carrier.clone(), c.routes.to_string(), grouped(c.total_seats)]);
            }
            table.write_to(out)?;
        }
        Command::Network { carrier, top } => {
            let carrier = known_carrier(snapshot, carrier)?;
            let summary = network_summary(&snapshot.aggregation, &snapshot.cbsa, &carrier, *top)
                .ok_or_else(|| anyhow!("carrier {carrier} has no routes"))?;
            if json {
                return write_json(out, &summary);
            }
            write_network(out, &summary)?;
        }
        Command::CarrierGroups { code, top } => {
            let groups = &snapshot.carrier_groups;
            if groups.is_empty() {
                bail!("no carrier group data loaded; add carrier_groups.csv to the data directory");
            }
            let Some(code) = code else {
                let listed = groups.list(&snapshot.aggregation);
                if json {
                    return write_json(out, &listed);
                }
                let mut table = Table::new(["code", "name", "carriers"]);
                for g in &listed {
                    table.row([g.code.to_string(), g.name.clone(), g.carriers.to_string()]);
                }
                table.write_to(out)?;
                return Ok(());
            };
            let summary = groups
                .summary(&snapshot.aggregation, &snapshot.cbsa, *code, *top)
                .ok_or_else(|| anyhow!("carrier group {code} has no routes in the loaded data"))?;
            if json {
                return write_json(out, &summary);
            }
            writeln!(out, "{} ({} carriers)", summary.group.name, summary.group.carriers)?;
            let mut table = Table::new(["carrier", "routes", "seats"]);
            for c in &summary.top_carriers {
                table.row([c.carrier.clone(), c.routes.to_string(), grouped(c.total_seats)]);
            }
            table.write_to(out)?;
            writeln!(out)?;
            write_network(out, &summary.network)?;
        }
        Command::Economics {
            carrier,
            casm,
            load_factor,
            yield_per_rpm,
            limit,
        } => {
            let carrier = known_carrier(snapshot, carrier)?;
            let defaults = EconomicsAssumptions::default();
            let assumptions = EconomicsAssumptions {
                casm: casm.unwrap_or(defaults.casm),
                load_factor: load_factor.unwrap_or(defaults.load_factor),
                yield_per_rpm: yield_per_rpm.unwrap_or(defaults.yield_per_rpm),
            };
            let mut routes = route_economics(&snapshot.aggregation, &carrier, &assumptions);
            let total_profit: f64 = routes.iter().map(|r| r.profit).sum();
            routes.truncate(*limit);
            if json {
                return write_json(
                    out,
                    &json!({
                        "carrier": carrier,
                        "assumptions": assumptions,
                        "total_profit": total_profit,
                        "routes": routes,
                    }),
                );
            }
            let mut table = Table::new(["route", "asm", "revenue", "cost", "profit", "margin"]);
            for r in &routes {
                table.row([
                    format!("{}-{}", r.source, r.destination),
                    grouped(r.asm),
                    grouped(r.revenue),
                    grouped(r.cost),
                    grouped(r.profit),
                    fixed(r.margin, 3),
                ]);
            }
            table.write_to(out)?;
            writeln!(out, "total profit: {}", grouped(total_profit))?;
        }
        Command::Scores { carrier, limit } => {
            let carrier = known_carrier(snapshot, carrier)?;
            let index = CompetitionIndex::build(&snapshot.aggregation);
            let engine = ScoreEngine::new(&snapshot.aggregation, &index);
            let outcomes = engine.score_routes(&carrier);
            let mut scored: Vec<&RouteScore> = outcomes.values().filter_map(|o| o.score()).collect();
            scored.sort_by(|a, b| {
                b.strategy_baseline
                    .total_cmp(&a.strategy_baseline)
                    .then_with(|| a.key.cmp(&b.key))
            });
            let unscorable = outcomes.len() - scored.len();
            if json {
                let routes: Vec<_> = outcomes.values().collect();
                return write_json(
                    out,
                    &json!({
                        "carrier": carrier,
                        "baseline": engine.baseline(&carrier),
                        "routes": routes,
                    }),
                );
            }
            if scored.is_empty() {
                writeln!(out, "{carrier}: insufficient data, no route has both seats and distance")?;
                return Ok(());
            }
            let mut table = Table::new([
                "route",
                "competition",
                "maturity",
                "percentile",
                "yield",
                "baseline",
            ]);
            for s in scored.iter().take(*limit) {
                table.row([
                    format!("{}-{}", s.key.source, s.key.destination),
                    label(&s.competition),
                    label(&s.maturity),
                    fixed(s.maturity_percentile, 3),
                    fixed(s.yield_proxy, 3),
                    fixed(s.strategy_baseline, 3),
                ]);
            }
            table.write_to(out)?;
            if unscorable > 0 {
                writeln!(out, "{unscorable} route(s) without seats or distance were not scored")?;
            }
        }
        Command::Corridors { carrier, top } => {
            let carrier = known_carrier(snapshot, carrier)?;
            let matcher = CbsaMatcher::new(&snapshot.cbsa, &snapshot.coords);
            let corridors = matcher.top_corridors(&snapshot.aggregation, &carrier, *top);
            if json {
                return write_json(out, &corridors);
            }
            let mut table = Table::new(["from", "to", "reference", "routes", "performance"]);
            for c in &corridors {
                table.row([
                    c.source.to_string(),
                    c.destination.to_string(),
                    format!("{}-{}", c.reference.source, c.reference.destination),
                    c.route_count.to_string(),
                    fixed(c.reference.performance_score, 3),
                ]);
            }
            table.write_to(out)?;
        }
        Command::Suggest {
            carrier,
            corridors,
            max_suggestions,
            candidate_cap,
        } => {
            let carrier = known_carrier(snapshot, carrier)?;
            let limits = SuggestionLimits {
                max_suggestions: *max_suggestions,
                candidate_cap: *candidate_cap,
            };
            let matcher = CbsaMatcher::new(&snapshot.cbsa, &snapshot.coords);
            let flown = snapshot.aggregation.carrier_route_set(&carrier);
            let results: Vec<_> = matcher
                .top_corridors(&snapshot.aggregation, &carrier, *corridors)
                .into_iter()
                .map(|corridor| {
                    let report = matcher.suggest(&corridor, &flown, limits);
                    (corridor, report)
                })
                .collect();
            if json {
                let body: Vec<_> = results
                    .iter()
                    .map(|(corridor, report)| json!({ "corridor": corridor, "report": report }))
                    .collect();
                return write_json(out, &body);
            }
            for (corridor, report) in &results {
                writeln!(
                    out,
                    "{} -> {} (reference {}-{}, {} mi)",
                    corridor.source,
                    corridor.destination,
                    corridor.reference.source,
                    corridor.reference.destination,
                    grouped(corridor.reference.distance_miles),
                )?;
                if report.corridor_excluded {
                    writeln!(out, "  not a domestic metro corridor, skipped\n")?;
                    continue;
                }
                let mut table = Table::new(["pair", "miles", "similarity", "opportunity"]);
                for s in &report.suggestions {
                    table.row([
                        format!("{}-{}", s.source, s.destination),
                        grouped(s.distance_miles),
                        fixed(s.distance_similarity, 3),
                        fixed(s.opportunity_score, 3),
                    ]);
                }
                table.write_to(out)?;
                if report.truncated {
                    writeln!(out, "  scan stopped at the candidate cap of {candidate_cap}")?;
                }
                writeln!(out)?;
            }
        }
        Command::Assign(args) => {
            let carrier = known_carrier(snapshot, &args.carrier)?;
            let fleet = FleetSpec::build(&parse_fleet(&args.fleet)?, &snapshot.equipment)?;
            let rules = args.rules();
            let routes = ranked_routes(&snapshot.aggregation, &carrier, args.route_limit);
            let result = simulate(&fleet, &routes, &rules, &snapshot.equipment)?;
            if json {
                return write_json(out, &result);
            }
            let s = &result.summary;
            writeln!(
                out,
                "{carrier}: {}/{} routes scheduled on {} tails, coverage {}, utilization {}",
                s.scheduled_flights,
                s.total_flights,
                s.tail_count,
                fixed(s.coverage, 3),
                fixed(s.utilization, 3),
            )?;
            let mut table =
                Table::new(["tail", "route", "requested", "match", "start", "end", "seats"]);
            for a in &result.assignments {
                table.row([
                    a.tail_id.clone(),
                    format!("{}-{}", a.source, a.destination),
                    a.equipment_requested.clone().unwrap_or_else(|| "-".to_string()),
                    label(&a.match_kind),
                    fixed(a.start_hour, 2),
                    fixed(a.end_hour, 2),
                    format!("{}/{}", a.seats_required, a.seats_offered),
                ]);
            }
            table.write_to(out)?;
            if !result.unassigned.is_empty() {
                writeln!(out, "\nunassigned")?;
                let mut table = Table::new(["route", "requested", "seats", "miles", "reason"]);
                for u in &result.unassigned {
                    table.row([
                        format!("{}-{}", u.source, u.destination),
                        u.equipment_requested.clone().unwrap_or_else(|| "-".to_string()),
                        u.seats_needed.to_string(),
                        grouped(u.distance_miles),
                        label(&u.reason),
                    ]);
                }
                table.write_to(out)?;
            }
        }
        Command::RankAircraft(args) => {
            let carrier = known_carrier(snapshot, &args.carrier)?;
            let distance = match (args.distance, &args.source, &args.destination) {
                (Some(distance), _, _) => distance,
                (None, Some(source), Some(destination)) => snapshot
                    .coords
                    .distance_miles(source, destination)
                    .ok_or_else(|| anyhow!("no coordinates for {source} or {destination}"))?,
                _ => bail!("pass --distance or both --source and --destination"),
            };
            let mut ranker = OptimalAircraftRanker::new(&snapshot.equipment);
            if let Some(raw) = &args.peer_class {
                let peer = PeerClass::parse(raw).ok_or_else(|| {
                    anyhow!("unknown peer class '{raw}'; expected legacy, low_cost, ultra_low_cost or regional")
                })?;
                ranker = ranker.with_peer_class(peer);
            }
            let usage = equipment_usage(&snapshot.aggregation, &carrier);
            let report = ranker.rank(&usage, distance, args.seat_demand, args.top)?;
            if json {
                return write_json(out, &report);
            }
            writeln!(
                out,
                "{carrier} on a {} mi route, peer class {} (benchmark LF {})",
                grouped(report.route_distance_miles),
                label(&report.peer_class),
                fixed(report.benchmark_load_factor, 2),
            )?;
            let mut table = Table::new([
                "equipment",
                "seats",
                "range",
                "utilization",
                "distance fit",
                "seat fit",
                "score",
            ]);
            for r in &report.recommendations {
                table.row([
                    r.equipment.clone(),
                    r.seats.to_string(),
                    grouped(r.max_range_miles),
                    fixed(r.utilization_score, 3),
                    fixed(r.distance_fit, 3),
                    optional(r.seat_fit, 3),
                    fixed(r.composite_score, 3),
                ]);
            }
            table.write_to(out)?;
            if !report.out_of_range.is_empty() {
                writeln!(out, "out of range: {}", report.out_of_range.join(", "))?;
            }
            if !report.unknown_equipment.is_empty() {
                writeln!(out, "unknown types: {}", report.unknown_equipment.join(", "))?;
            }
        }
        Command::Demand { scope, view } => {
            let records = snapshot
                .demand
                .as_deref()
                .ok_or_else(|| anyhow!("no demand.csv in the data directory"))?;
            run_demand(scope, view, records, json, out)?;
        }
    }
    Ok(())
}

fn quarterly(scope: &DemandScope, records: &[DemandRecord]) -> Vec<MarketQuarter> {
    build_market_quarterly(records, scope.directional, scope.since_year)
}

fn run_demand(
    scope: &DemandScope,
    view: &DemandView,
    records: &[DemandRecord],
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    match view {
        DemandView::TopMarkets { top, exclude } => {
            let totals = aggregate_market_totals(&quarterly(scope, records));
            let ranked = rank_markets(&totals, *top, exclude);
            if json {
                return write_json(out, &ranked);
            }
            let mut table = Table::new(["rank", "market", "passengers", "fare", "miles", "fare/mi"]);
            for r in &ranked {
                table.row([
                    r.rank.to_string(),
                    r.market.market.clone(),
                    grouped(r.market.passengers_total),
                    optional(r.market.avg_fare, 2),
                    optional(r.market.distance, 0),
                    optional(r.market.fare_per_mile, 3),
                ]);
            }
            table.write_to(out)?;
        }
        DemandView::Concentration { top_share } => {
            let totals = aggregate_market_totals(&quarterly(scope, records));
            let stats = compute_concentration(&totals, *top_share)?;
            if json {
                return write_json(out, &stats);
            }
            writeln!(
                out,
                "{} markets, {} passengers",
                stats.markets,
                grouped(stats.total_passengers)
            )?;
            writeln!(
                out,
                "top {} markets ({}%) carry {} of passengers",
                stats.top_markets,
                fixed(stats.top_share * 100.0, 1),
                optional(stats.top_passenger_share, 3),
            )?;
            writeln!(
                out,
                "long tail of {} markets carries {}",
                stats.long_tail_markets,
                optional(stats.long_tail_passenger_share, 3),
            )?;
        }
        DemandView::Stability {
            limit,
            stable_residual_cv_max,
            stable_seasonality_max,
            seasonal_seasonality_min,
            seasonal_residual_cv_max,
        } => {
            let defaults = StabilityThresholds::default();
            let thresholds = StabilityThresholds {
                stable_residual_cv_max: stable_residual_cv_max
                    .unwrap_or(defaults.stable_residual_cv_max),
                stable_seasonality_max: stable_seasonality_max
                    .unwrap_or(defaults.stable_seasonality_max),
                seasonal_seasonality_min: seasonal_seasonality_min
                    .unwrap_or(defaults.seasonal_seasonality_min),
                seasonal_residual_cv_max: seasonal_residual_cv_max
                    .unwrap_or(defaults.seasonal_residual_cv_max),
            };
            let mut markets = market_stability(&quarterly(scope, records), &thresholds);
            markets.truncate(*limit);
            if json {
                return write_json(out, &markets);
            }
            let mut table = Table::new([
                "market",
                "passengers",
                "cv",
                "seasonality",
                "residual cv",
                "class",
            ]);
            for m in &markets {
                table.row([
                    m.market.clone(),
                    grouped(m.total_passengers),
                    optional(m.cv, 3),
                    optional(m.seasonality_index, 3),
                    optional(m.residual_cv, 3),
                    m.classification.to_string(),
                ]);
            }
            table.write_to(out)?;
        }
    }
    Ok(())
}
