use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Federal-state name of the fallback region factor row.
pub const DEFAULT_REGION_STATE: &str = "DEFAULT";

/// Surrogate key assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One postal/administrative unit. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: EntityId,
    pub federal_state: String,
    pub country: String,
    pub area: String,
    pub city: String,
    pub postal_code: String,
    pub district: String,
    pub region_factor_id: EntityId,
}

impl Region {
    pub fn key(&self) -> RegionKey {
        RegionKey {
            federal_state: self.federal_state.clone(),
            country: self.country.clone(),
            area: self.area.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            district: self.district.clone(),
        }
    }
}

/// Region row as produced by the loader, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegion {
    pub federal_state: String,
    pub country: String,
    pub area: String,
    pub city: String,
    pub postal_code: String,
    pub district: String,
    pub region_factor_id: EntityId,
}

impl NewRegion {
    pub fn key(&self) -> RegionKey {
        RegionKey {
            federal_state: self.federal_state.clone(),
            country: self.country.clone(),
            area: self.area.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            district: self.district.clone(),
        }
    }
}

/// Natural composite key of a region; unique across the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionKey {
    pub federal_state: String,
    pub country: String,
    pub area: String,
    pub city: String,
    pub postal_code: String,
    pub district: String,
}

/// Per-federal-state premium multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionFactor {
    pub id: EntityId,
    pub federal_state: String,
    pub factor: Decimal,
}

impl RegionFactor {
    pub fn is_default(&self) -> bool {
        self.federal_state == DEFAULT_REGION_STATE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleType {
    pub id: EntityId,
    pub name: String,
    pub factor: Decimal,
}

/// Multiplier for an inclusive annual-mileage range; `max_mileage: None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageFactor {
    pub id: EntityId,
    pub min_mileage: u32,
    pub max_mileage: Option<u32>,
    pub factor: Decimal,
}

impl MileageFactor {
    pub fn covers(&self, mileage: u32) -> bool {
        self.min_mileage <= mileage && self.max_mileage.map_or(true, |max| mileage <= max)
    }

    /// `"<min>-<max> km"`, or `"<min>+ km"` for the open-ended range.
    pub fn range_label(&self) -> String {
        match self.max_mileage {
            Some(max) => format!("{}-{} km", self.min_mileage, max),
            None => format!("{}+ km", self.min_mileage),
        }
    }
}

/// Administrative payload for creating or replacing a region factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionFactorInput {
    pub federal_state: String,
    pub factor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTypeInput {
    pub name: String,
    pub factor: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageFactorInput {
    pub min_mileage: u32,
    #[serde(default)]
    pub max_mileage: Option<u32>,
    pub factor: Decimal,
}
