//! Core data models shared by the matcher, reconciler, and API client

use serde::{Deserialize, Serialize};

/// A fleet or personnel resource as returned by the scheduling API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub custom_fields: CustomFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truck: Option<Vehicle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub van: Option<Vehicle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tractor: Option<Vehicle>,
}

impl Resource {
    /// Vehicle details for a kind, if the resource carries that key
    pub fn vehicle(&self, kind: VehicleKind) -> Option<&Vehicle> {
        match kind {
            VehicleKind::Truck => self.truck.as_ref(),
            VehicleKind::Van => self.van.as_ref(),
            VehicleKind::Tractor => self.tractor.as_ref(),
        }
    }
}

/// Free-form identifiers attached to a resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employeenumber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fleetno: Option<String>,
}

/// Vehicle details nested under a kind key on a resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
}

/// The vehicle kind keys a resource may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    Truck,
    Van,
    Tractor,
}

impl VehicleKind {
    /// All kinds, in the order the plate-matching tier scans them
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Truck, VehicleKind::Van, VehicleKind::Tractor];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleKind::Truck => "truck",
            VehicleKind::Van => "van",
            VehicleKind::Tractor => "tractor",
        }
    }
}

/// A time-bounded record marking a resource as unavailable
///
/// `id` is assigned by the owning system and absent until the record is
/// persisted there. `external_id` links to the counterpart record's own id
/// in the other system. Start and end times are carried as opaque strings
/// and round-trip unmodified through create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unavailability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
