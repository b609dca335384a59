use airnet_data::{load_snapshot, DataError};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn scratch_dir() -> PathBuf {
    let n = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("airnet-data-{}-{n}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_required(dir: &PathBuf) {
    fs::write(
        dir.join("segments.csv"),
        "carrier,source,destination,equipment,seats,distance_miles,seat_source\n\
         AA,JFK,LAX,A321,190,2475,\n\
         AA,LAX,JFK,A321,190,2475,\n\
         ,JFK,BOS,E175,76,187,\n\
         DL,JFK,LAX,B739,178,2475,\n",
    )
    .unwrap();
    fs::write(
        dir.join("cbsa.csv"),
        "airport,cbsa_id,cbsa_name,country\n\
         JFK,35620,New York-Newark-Jersey City,US\n\
         LAX,31080,Los Angeles-Long Beach-Anaheim,US\n",
    )
    .unwrap();
    fs::write(
        dir.join("airports.csv"),
        "airport,latitude,longitude\nJFK,40.6413,-73.7781\nLAX,33.9416,-118.4085\n",
    )
    .unwrap();
}

#[test]
fn loads_required_files_and_reports_drops() {
    let dir = scratch_dir();
    write_required(&dir);

    let snapshot = load_snapshot(&dir).unwrap();
    assert_eq!(snapshot.report.markets, 3);
    assert_eq!(snapshot.report.carriers, 2);
    assert_eq!(snapshot.report.segments_without_codes, 1);
    assert!(snapshot.demand.is_none());
    assert_eq!(snapshot.coords.len(), 2);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn optional_demand_file_is_picked_up() {
    let dir = scratch_dir();
    write_required(&dir);
    fs::write(
        dir.join("demand.csv"),
        "year,quarter,origin,dest,passengers,avg_fare,distance\n2023,1,JFK,LAX,1200,310.5,2475\n",
    )
    .unwrap();

    let snapshot = load_snapshot(&dir).unwrap();
    assert_eq!(snapshot.demand.map(|d| d.len()), Some(1));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn optional_carrier_groups_file_is_picked_up() {
    let dir = scratch_dir();
    write_required(&dir);

    let snapshot = load_snapshot(&dir).unwrap();
    assert!(snapshot.carrier_groups.is_empty());
    assert!(snapshot.report.carrier_groups.is_none());

    fs::write(
        dir.join("carrier_groups.csv"),
        "carrier,carrier_group,group_name
AA,3,Major Carriers
DL,3,
",
    )
    .unwrap();
    let snapshot = load_snapshot(&dir).unwrap();
    assert_eq!(snapshot.carrier_groups.group_of("AA"), Some(3));
    assert_eq!(snapshot.carrier_groups.list(&snapshot.aggregation)[0].carriers, 2);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_required_file_is_an_error() {
    let dir = scratch_dir();
    let err = load_snapshot(&dir).unwrap_err();
    assert!(matches!(err, DataError::MissingFile(path) if path.ends_with("segments.csv")));

    fs::remove_dir_all(&dir).ok();
}
