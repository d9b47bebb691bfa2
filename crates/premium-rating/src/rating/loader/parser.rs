use csv::StringRecord;

use super::normalizer::{clean_field, normalize_header};
use super::RegionLoadError;
use crate::rating::domain::{EntityId, NewRegion, RegionKey};

pub(crate) const STATE_COLUMN: &str = "REGION1";
pub(crate) const COUNTRY_COLUMN: &str = "REGION3";
pub(crate) const AREA_COLUMN: &str = "REGION4";
pub(crate) const CITY_COLUMN: &str = "ORT";
pub(crate) const POSTAL_CODE_COLUMN: &str = "POSTLEITZAHL";
pub(crate) const DISTRICT_COLUMN: &str = "AREA1";

/// Positions of the six region columns within the source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegionColumns {
    state: usize,
    country: usize,
    area: usize,
    city: usize,
    postal_code: usize,
    district: usize,
}

impl RegionColumns {
    pub(crate) fn locate(headers: &StringRecord) -> Result<Self, RegionLoadError> {
        let labels: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &'static str| {
            labels
                .iter()
                .position(|label| label == name)
                .ok_or(RegionLoadError::MissingColumn(name))
        };

        Ok(Self {
            state: find(STATE_COLUMN)?,
            country: find(COUNTRY_COLUMN)?,
            area: find(AREA_COLUMN)?,
            city: find(CITY_COLUMN)?,
            postal_code: find(POSTAL_CODE_COLUMN)?,
            district: find(DISTRICT_COLUMN)?,
        })
    }

    fn widest(&self) -> usize {
        [
            self.state,
            self.country,
            self.area,
            self.city,
            self.postal_code,
            self.district,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
    }

    /// `None` when the record is too short to hold every located column.
    pub(crate) fn extract(&self, record: &StringRecord) -> Option<RegionFields> {
        if record.len() <= self.widest() {
            return None;
        }
        let cell = |index: usize| record.get(index).map(clean_field).unwrap_or_default();

        Some(RegionFields {
            federal_state: cell(self.state),
            country: cell(self.country),
            area: cell(self.area),
            city: cell(self.city),
            postal_code: cell(self.postal_code),
            district: cell(self.district),
        })
    }
}

/// Cleaned cell values of one source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegionFields {
    pub(crate) federal_state: String,
    pub(crate) country: String,
    pub(crate) area: String,
    pub(crate) city: String,
    pub(crate) postal_code: String,
    pub(crate) district: String,
}

impl RegionFields {
    /// Area and district may be blank; the rest identify the locality.
    pub(crate) fn is_complete(&self) -> bool {
        ![
            &self.federal_state,
            &self.country,
            &self.city,
            &self.postal_code,
        ]
        .iter()
        .any(|value| value.is_empty())
    }

    pub(crate) fn key(&self) -> RegionKey {
        RegionKey {
            federal_state: self.federal_state.clone(),
            country: self.country.clone(),
            area: self.area.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            district: self.district.clone(),
        }
    }

    pub(crate) fn into_region(self, region_factor_id: EntityId) -> NewRegion {
        NewRegion {
            federal_state: self.federal_state,
            country: self.country,
            area: self.area,
            city: self.city,
            postal_code: self.postal_code,
            district: self.district,
            region_factor_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(labels: &[&str]) -> StringRecord {
        StringRecord::from(labels.to_vec())
    }

    #[test]
    fn columns_are_found_in_any_order() {
        let columns = RegionColumns::locate(&header(&[
            "ORT",
            "extra",
            "postleitzahl",
            "REGION1",
            "REGION3",
            "REGION4",
            "AREA1",
        ]))
        .expect("all columns present");

        let fields = columns
            .extract(&StringRecord::from(vec![
                "Berlin", "x", "10115", "Berlin", "Deutschland", "Berlin", "Mitte",
            ]))
            .expect("wide enough");
        assert_eq!(fields.postal_code, "10115");
        assert_eq!(fields.district, "Mitte");
        assert!(fields.is_complete());
    }

    #[test]
    fn missing_column_is_named() {
        let err = RegionColumns::locate(&header(&["REGION1", "REGION3", "REGION4", "ORT", "AREA1"]))
            .expect_err("postal code column missing");
        match err {
            RegionLoadError::MissingColumn(name) => assert_eq!(name, POSTAL_CODE_COLUMN),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn short_records_are_rejected() {
        let columns = RegionColumns::locate(&header(&[
            "REGION1",
            "REGION3",
            "REGION4",
            "ORT",
            "POSTLEITZAHL",
            "AREA1",
        ]))
        .expect("columns");
        assert!(columns
            .extract(&StringRecord::from(vec!["Bayern", "Deutschland", "Oberbayern"]))
            .is_none());
    }

    #[test]
    fn blank_area_and_district_still_complete() {
        let fields = RegionFields {
            federal_state: "Hessen".to_string(),
            country: "Deutschland".to_string(),
            area: String::new(),
            city: "Kassel".to_string(),
            postal_code: "34117".to_string(),
            district: String::new(),
        };
        assert!(fields.is_complete());

        let mut missing_city = fields.clone();
        missing_city.city.clear();
        assert!(!missing_city.is_complete());
    }
}
