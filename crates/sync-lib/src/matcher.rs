//! Heuristic matching of local resources to master resources
//!
//! The two systems share no identifier space, so resources are paired with
//! a priority-ordered set of rules:
//! 1. Custom fields (`employeenumber`, then `fleetno`)
//! 2. Normalized license plates per vehicle kind
//! 3. Normalized names
//!
//! The first rule that produces a hit wins; signals are never combined.
//! Master resources are scanned in sorted-id order so ties break the same
//! way on every run regardless of API page order.

use crate::models::{Resource, VehicleKind};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Matches local resources against the master resource set
pub struct ResourceMatcher {
    master_resources: Vec<Resource>,
}

impl ResourceMatcher {
    /// Create a matcher over the master resource set
    pub fn new(mut master_resources: Vec<Resource>) -> Self {
        master_resources.sort_by(|a, b| a.id.cmp(&b.id));
        Self { master_resources }
    }

    /// Find the master resource id matching a single local resource
    ///
    /// Returns `None` when no rule tier produces a hit; that outcome is a
    /// warning, not an error.
    pub fn find_match(&self, local: &Resource) -> Option<&str> {
        let matched = self
            .match_by_custom_fields(local)
            .or_else(|| self.match_by_license_plate(local))
            .or_else(|| self.match_by_name(local));

        if matched.is_none() {
            warn!(
                resource_id = %local.id,
                name = %local.name,
                "No master match found for resource"
            );
        }

        matched
    }

    /// Match every local resource, returning local id -> master id
    ///
    /// Local resources are scanned in sorted-id order. Resources with no
    /// match are omitted from the map. A master id already claimed by an
    /// earlier local resource is rejected for later claimants rather than
    /// mapped twice.
    pub fn match_all(&self, local_resources: &[Resource]) -> BTreeMap<String, String> {
        let mut locals: Vec<&Resource> = local_resources.iter().collect();
        locals.sort_by(|a, b| a.id.cmp(&b.id));

        let mut matches = BTreeMap::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for local in locals {
            if let Some(master_id) = self.find_match(local) {
                if claimed.contains(master_id) {
                    warn!(
                        resource_id = %local.id,
                        master_id = %master_id,
                        "Master resource already claimed; leaving resource unmatched"
                    );
                    continue;
                }
                claimed.insert(master_id);
                matches.insert(local.id.clone(), master_id.to_string());
            }
        }

        info!(
            matched = matches.len(),
            total = local_resources.len(),
            "Resource matching complete"
        );

        matches
    }

    /// Tier 1: match on the `employeenumber` or `fleetno` custom field
    fn match_by_custom_fields(&self, local: &Resource) -> Option<&str> {
        let cf_local = &local.custom_fields;

        for master in &self.master_resources {
            let cf_master = &master.custom_fields;

            if non_empty_eq(
                cf_local.employeenumber.as_deref(),
                cf_master.employeenumber.as_deref(),
            ) {
                debug!(master_id = %master.id, "Matched by employeenumber");
                return Some(&master.id);
            }

            if non_empty_eq(cf_local.fleetno.as_deref(), cf_master.fleetno.as_deref()) {
                debug!(master_id = %master.id, "Matched by fleetno");
                return Some(&master.id);
            }
        }

        None
    }

    /// Tier 2: match on a normalized license plate of the same vehicle kind
    fn match_by_license_plate(&self, local: &Resource) -> Option<&str> {
        for kind in VehicleKind::ALL {
            let Some(plate_local) = local.vehicle(kind).and_then(|v| v.license_plate.as_deref())
            else {
                continue;
            };
            if plate_local.is_empty() {
                continue;
            }
            let normalized_local = normalize_plate(plate_local);

            for master in &self.master_resources {
                let Some(plate_master) =
                    master.vehicle(kind).and_then(|v| v.license_plate.as_deref())
                else {
                    continue;
                };
                if !plate_master.is_empty() && normalize_plate(plate_master) == normalized_local {
                    debug!(
                        master_id = %master.id,
                        kind = kind.as_str(),
                        plate = %normalized_local,
                        "Matched by license plate"
                    );
                    return Some(&master.id);
                }
            }
        }

        None
    }

    /// Tier 3: match on the trimmed, case-folded name
    fn match_by_name(&self, local: &Resource) -> Option<&str> {
        let name_local = normalize_name(&local.name);
        if name_local.is_empty() {
            return None;
        }

        for master in &self.master_resources {
            if normalize_name(&master.name) == name_local {
                debug!(master_id = %master.id, name = %name_local, "Matched by name");
                return Some(&master.id);
            }
        }

        None
    }
}

/// True when both values are present, non-empty, and equal
fn non_empty_eq(local: Option<&str>, master: Option<&str>) -> bool {
    match (local, master) {
        (Some(l), Some(m)) => !l.is_empty() && l == m,
        _ => false,
    }
}

/// Plates compare with all whitespace stripped and case folded
fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
