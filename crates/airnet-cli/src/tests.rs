use airnet_core::{
    AirportCoords, CarrierGroups, CbsaLookup, DemandRecord, EquipmentTable, SegmentRecord,
};
use airnet_data::DataSnapshot;
use clap::Parser;
use serde_json::Value;

use crate::commands::{Command, DemandView};
use crate::{run, Cli};

fn snapshot() -> DataSnapshot {
    let segments = vec![
        SegmentRecord::new("UA", "DEN", "ORD", "A320", 500.0, 888.0),
        SegmentRecord::new("UA", "DEN", "IAH", "A320", 300.0, 862.0),
        SegmentRecord::new("UA", "DEN", "ASE", "E175", 76.0, 125.0),
        SegmentRecord::new("WN", "DEN", "ORD", "B738", 175.0, 888.0),
    ];
    let mut cbsa = CbsaLookup::new();
    cbsa.insert_metro("DEN", "19740", "Denver-Aurora-Centennial");
    cbsa.insert_metro("ORD", "16980", "Chicago-Naperville-Elgin");
    cbsa.insert_metro("MDW", "16980", "Chicago-Naperville-Elgin");
    cbsa.insert_metro("IAH", "26420", "Houston-Pasadena-The Woodlands");
    cbsa.insert_metro("ASE", "24060", "Glenwood Springs");

    let mut coords = AirportCoords::new();
    coords.insert("DEN", 39.8561, -104.6737);
    coords.insert("ORD", 41.9742, -87.9073);
    coords.insert("MDW", 41.7868, -87.7522);
    coords.insert("IAH", 29.9902, -95.3368);
    coords.insert("ASE", 39.2232, -106.8688);

    let demand = vec![DemandRecord {
        year: 2024,
        quarter: 1,
        origin: "DEN".into(),
        dest: "ORD".into(),
        passengers: 900.0,
        avg_fare: 180.0,
        distance: 888.0,
    }];

    DataSnapshot::from_parts(&segments, cbsa, coords, EquipmentTable::default(), Some(demand))
}

fn exec_on(snapshot: &DataSnapshot, args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args)?;
    let mut out = Vec::new();
    run(&cli.command, snapshot, cli.json, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn exec(args: &[&str]) -> anyhow::Result<String> {
    exec_on(&snapshot(), args)
}

#[test]
fn data_dir_defaults_and_json_is_global() {
    let cli = Cli::try_parse_from(["airnet", "carriers", "--json"]).unwrap();
    assert!(cli.json);
    assert!(matches!(cli.command, Command::Carriers { limit: 50, .. }));

    let cli = Cli::try_parse_from(["airnet", "--data-dir", "/tmp/x", "scores", "UA"]).unwrap();
    assert_eq!(cli.data_dir.to_str(), Some("/tmp/x"));
}

#[test]
fn parses_demand_scope_before_the_view() {
    let cli = Cli::try_parse_from([
        "airnet",
        "demand",
        "--directional",
        "--since-year",
        "2022",
        "top-markets",
        "--exclude",
        "DEN,ord",
    ])
    .unwrap();
    match cli.command {
        Command::Demand { scope, view } => {
            assert!(scope.directional);
            assert_eq!(scope.since_year, Some(2022));
            match view {
                DemandView::TopMarkets { top, exclude } => {
                    assert_eq!(top, 50);
                    assert_eq!(exclude, vec!["DEN".to_string(), "ord".to_string()]);
                }
                other => panic!("unexpected view {other:?}"),
            }
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn rank_aircraft_distance_conflicts_with_airports() {
    let parsed = Cli::try_parse_from([
        "airnet",
        "rank-aircraft",
        "UA",
        "--distance",
        "900",
        "--source",
        "DEN",
        "--destination",
        "ORD",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn carriers_table_lists_both_carriers() {
    let text = exec(&["airnet", "carriers"]).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("UA"));
    assert!(lines[3].starts_with("WN"));
}

#[test]
fn unknown_carrier_is_an_error() {
    let err = exec(&["airnet", "network", "ZZ"]).unwrap_err();
    assert!(err.to_string().contains("ZZ"));
}

#[test]
fn scores_json_carries_baseline() {
    let text = exec(&["airnet", "scores", "ua", "--json"]).unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["carrier"], "UA");
    assert_eq!(body["baseline"]["valid_routes"], 3);
    assert_eq!(body["routes"].as_array().unwrap().len(), 3);
}

#[test]
fn suggest_finds_the_unflown_chicago_airport() {
    let text = exec(&["airnet", "suggest", "UA", "--corridors", "1", "--json"]).unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    let suggestions = body[0]["report"]["suggestions"].as_array().unwrap();
    assert!(suggestions
        .iter()
        .any(|s| s["source"] == "DEN" && s["destination"] == "MDW"));
}

#[test]
fn assign_reports_unassigned_routes() {
    let text = exec(&["airnet", "assign", "UA", "--fleet", "E175:1", "--json"]).unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["summary"]["total_flights"], 3);
    assert_eq!(body["summary"]["tail_count"], 1);
    let scheduled = body["summary"]["scheduled_flights"].as_u64().unwrap();
    let unassigned = body["unassigned"].as_array().unwrap().len() as u64;
    assert_eq!(scheduled + unassigned, 3);
}

#[test]
fn assign_rejects_bad_fleet_strings() {
    assert!(exec(&["airnet", "assign", "UA", "--fleet", "A320"]).is_err());
    assert!(exec(&["airnet", "assign", "UA", "--fleet", "A320:0"]).is_err());
}

#[test]
fn rank_aircraft_prints_a_table() {
    let text = exec(&["airnet", "rank-aircraft", "UA", "--source", "DEN", "--destination", "ORD"])
        .unwrap();
    assert!(text.contains("A320"));
    assert!(text.contains("peer class"));
}

#[test]
fn demand_concentration_validates_top_share() {
    assert!(exec(&["airnet", "demand", "concentration", "--top-share", "0"]).is_err());
    let text = exec(&["airnet", "demand", "concentration", "--json"]).unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["markets"], 1);
    assert_eq!(body["top_markets"], 1);
}

#[test]
fn network_text_lists_top_equipment() {
    let text = exec(&["airnet", "network", "UA"]).unwrap();
    assert!(text.contains("equipment: A320 (2), E175 (1)"));
}

#[test]
fn carrier_groups_list_and_pool() {
    assert!(exec(&["airnet", "carrier-groups"]).is_err());

    let mut groups = CarrierGroups::new();
    groups.assign("UA", 3);
    groups.assign("WN", 3);
    groups.set_name(3, "Major Carriers");
    let snapshot = snapshot().with_carrier_groups(groups);

    let text = exec_on(&snapshot, &["airnet", "carrier-groups"]).unwrap();
    assert!(text.lines().nth(2).unwrap().starts_with("3     Major Carriers  2"));

    let text = exec_on(&snapshot, &["airnet", "carrier-groups", "3", "--json"]).unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["top_carriers"][0]["carrier"], "UA");
    assert_eq!(body["network"]["total_routes"], 3);
    assert_eq!(body["network"]["total_seats"], 1051.0);

    assert!(exec_on(&snapshot, &["airnet", "carrier-groups", "7"]).is_err());
}
