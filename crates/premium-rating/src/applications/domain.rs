use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rating::CalculationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    New,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "ACCEPTED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(UnknownStatus(raw.to_string())),
        }
    }
}

/// A premium quote the customer applied for, frozen at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub postal_code: String,
    pub vehicle_type: String,
    pub annual_mileage: u32,
    pub base_premium: Decimal,
    pub mileage_factor: Decimal,
    pub vehicle_factor: Decimal,
    pub region_factor: Decimal,
    pub calculated_premium: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

/// Application content before the repository assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub postal_code: String,
    pub vehicle_type: String,
    pub annual_mileage: u32,
    pub base_premium: Decimal,
    pub mileage_factor: Decimal,
    pub vehicle_factor: Decimal,
    pub region_factor: Decimal,
    pub calculated_premium: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: ApplicationStatus,
}

impl NewApplication {
    pub fn from_calculation(result: CalculationResult, created_at: DateTime<Utc>) -> Self {
        Self {
            postal_code: result.postal_code,
            vehicle_type: result.vehicle_type,
            annual_mileage: result.annual_mileage,
            base_premium: result.base_premium,
            mileage_factor: result.mileage_factor,
            vehicle_factor: result.vehicle_type_factor,
            region_factor: result.region_factor,
            calculated_premium: result.premium,
            created_at,
            status: ApplicationStatus::New,
        }
    }

    pub fn with_id(self, id: ApplicationId) -> Application {
        Application {
            id,
            postal_code: self.postal_code,
            vehicle_type: self.vehicle_type,
            annual_mileage: self.annual_mileage,
            base_premium: self.base_premium,
            mileage_factor: self.mileage_factor,
            vehicle_factor: self.vehicle_factor,
            region_factor: self.region_factor,
            calculated_premium: self.calculated_premium,
            created_at: self.created_at,
            status: self.status,
        }
    }
}
