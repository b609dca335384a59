//! Carrier groups: carriers filed under one group code and analysed as a
//! single pooled network.

use crate::lookup::CbsaLookup;
use crate::market::MarketAggregation;
use crate::models::normalize_code;
use crate::network::{network_summary, CarrierEntry, NetworkSummary};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Member carriers listed in a group summary.
pub const TOP_GROUP_CARRIERS: usize = 15;

/// Carrier to group-code assignments plus optional display names.
#[derive(Debug, Clone, Default)]
pub struct CarrierGroups {
    members: BTreeMap<String, u32>,
    names: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierGroupEntry {
    pub code: u32,
    pub name: String,
    /// Members with at least one route in the loaded data
    pub carriers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: CarrierGroupEntry,
    /// Largest members by seats
    pub top_carriers: Vec<CarrierEntry>,
    /// The members' markets pooled by airport pair
    pub network: NetworkSummary,
}

impl CarrierGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `carrier` in group `code`, replacing any earlier assignment.
    /// False for a blank carrier code.
    pub fn assign(&mut self, carrier: &str, code: u32) -> bool {
        match normalize_code(carrier) {
            Some(carrier) => {
                self.members.insert(carrier, code);
                true
            }
            None => false,
        }
    }

    pub fn set_name(&mut self, code: u32, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.names.insert(code, name.to_string());
        }
    }

    pub fn group_of(&self, carrier: &str) -> Option<u32> {
        self.members.get(&normalize_code(carrier)?).copied()
    }

    /// Display name, `Carrier Group <code>` when none was supplied.
    pub fn name_of(&self, code: u32) -> String {
        self.names
            .get(&code)
            .cloned()
            .unwrap_or_else(|| format!("Carrier Group {code}"))
    }

    pub fn members(&self, code: u32) -> BTreeSet<String> {
        self.members
            .iter()
            .filter(|(_, group)| **group == code)
            .map(|(carrier, _)| carrier.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn flying_members(&self, aggregation: &MarketAggregation, code: u32) -> BTreeSet<String> {
        self.members(code)
            .into_iter()
            .filter(|carrier| aggregation.has_carrier(carrier))
            .collect()
    }

    /// Groups with at least one member present in `aggregation`, in code order.
    pub fn list(&self, aggregation: &MarketAggregation) -> Vec<CarrierGroupEntry> {
        let codes: BTreeSet<u32> = self.members.values().copied().collect();
        codes
            .into_iter()
            .filter_map(|code| {
                let carriers = self.flying_members(aggregation, code).len();
                (carriers > 0).then(|| CarrierGroupEntry {
                    code,
                    name: self.name_of(code),
                    carriers,
                })
            })
            .collect()
    }

    /// Pooled network of one group, `None` when no member flies anything.
    pub fn summary(
        &self,
        aggregation: &MarketAggregation,
        cbsa: &CbsaLookup,
        code: u32,
        top_n: usize,
    ) -> Option<GroupSummary> {
        let members = self.flying_members(aggregation, code);
        if members.is_empty() {
            return None;
        }

        let mut top_carriers: Vec<CarrierEntry> = members
            .iter()
            .map(|carrier| {
                let (routes, total_seats) = aggregation
                    .carrier_markets(carrier)
                    .fold((0, 0.0), |(n, seats), m| (n + 1, seats + m.total_seats));
                CarrierEntry {
                    carrier: carrier.clone(),
                    routes,
                    total_seats,
                }
            })
            .collect();
        top_carriers.sort_by(|a, b| {
            b.total_seats
                .total_cmp(&a.total_seats)
                .then_with(|| a.carrier.cmp(&b.carrier))
        });
        top_carriers.truncate(TOP_GROUP_CARRIERS);

        let pooled = aggregation.pooled(&members, &format!("GROUP-{code}"));
        let network = network_summary(&pooled, cbsa, &format!("GROUP-{code}"), top_n)?;

        Some(GroupSummary {
            group: CarrierGroupEntry {
                code,
                name: self.name_of(code),
                carriers: members.len(),
            },
            top_carriers,
            network,
        })
    }
}
