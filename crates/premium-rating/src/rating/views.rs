use rust_decimal::Decimal;
use serde::Serialize;

use super::domain::{MileageFactor, Region, RegionFactor, VehicleType};

/// Read-only rendering of any factor row for catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorView {
    pub name: String,
    pub factor: Decimal,
    pub description: String,
}

impl From<&RegionFactor> for FactorView {
    fn from(value: &RegionFactor) -> Self {
        Self {
            name: value.federal_state.clone(),
            factor: value.factor,
            description: format!("Region factor for {}", value.federal_state),
        }
    }
}

impl From<&VehicleType> for FactorView {
    fn from(value: &VehicleType) -> Self {
        Self {
            name: value.name.clone(),
            factor: value.factor,
            description: format!("Vehicle type factor for {}", value.name),
        }
    }
}

impl From<&MileageFactor> for FactorView {
    fn from(value: &MileageFactor) -> Self {
        let range = value.range_label();
        Self {
            description: format!("Mileage factor for {range} per year"),
            name: range,
            factor: value.factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorCatalog {
    pub region_factors: Vec<FactorView>,
    pub vehicle_type_factors: Vec<FactorView>,
    pub mileage_factors: Vec<FactorView>,
}

/// Address fields of a region, without the internal ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeView {
    pub postal_code: String,
    pub federal_state: String,
    pub country: String,
    pub area: String,
    pub city: String,
    pub district: String,
}

impl From<Region> for PostcodeView {
    fn from(region: Region) -> Self {
        Self {
            postal_code: region.postal_code,
            federal_state: region.federal_state,
            country: region.country,
            area: region.area,
            city: region.city,
            district: region.district,
        }
    }
}
