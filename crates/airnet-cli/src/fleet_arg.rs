//! Parsing of `--fleet` values.
//!
//! A fleet is a comma list of `TYPE:COUNT[:SEATS[:RANGE_MI]]`, for example
//! `A320:4,E175:2,XYZ1:1:120:1500`. Seats and range override the equipment
//! table and are required for types it does not know.

use airnet_core::FleetEntry;
use anyhow::{anyhow, bail, Context, Result};

fn parse_entry(raw: &str) -> Result<FleetEntry> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if parts.len() < 2 || parts.len() > 4 {
        bail!("fleet entry '{raw}' must look like TYPE:COUNT[:SEATS[:RANGE_MI]]");
    }
    let count: u32 = parts[1]
        .parse()
        .with_context(|| format!("tail count in '{raw}'"))?;
    let mut entry = FleetEntry::new(parts[0], count);
    if let Some(seats) = parts.get(2) {
        entry.seats = Some(seats.parse().with_context(|| format!("seats in '{raw}'"))?);
    }
    if let Some(range) = parts.get(3) {
        entry.max_range_miles = Some(range.parse().with_context(|| format!("range in '{raw}'"))?);
    }
    Ok(entry)
}

pub fn parse_fleet(raw: &str) -> Result<Vec<FleetEntry>> {
    let entries = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_entry)
        .collect::<Result<Vec<_>>>()?;
    if entries.is_empty() {
        return Err(anyhow!("--fleet needs at least one TYPE:COUNT entry"));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_counts_and_overrides() {
        let fleet = parse_fleet("A320:4, E175:2 ,XYZ1:1:120:1500").unwrap();
        assert_eq!(fleet.len(), 3);
        assert_eq!(fleet[0].equipment, "A320");
        assert_eq!(fleet[0].count, 4);
        assert_eq!(fleet[0].seats, None);
        assert_eq!(fleet[2].seats, Some(120));
        assert_eq!(fleet[2].max_range_miles, Some(1500.0));
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(parse_fleet("A320").is_err());
        assert!(parse_fleet("A320:four").is_err());
        assert!(parse_fleet("A320:1:150:3000:extra").is_err());
        assert!(parse_fleet(" , ").is_err());
    }
}
