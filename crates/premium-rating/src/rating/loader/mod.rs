//! One-shot import of the postal region table from a delimited export.
//!
//! The source carries one row per postal/administrative unit with the columns
//! `REGION1` (federal state), `REGION3` (country), `REGION4` (area), `ORT` (city),
//! `POSTLEITZAHL` (postal code) and `AREA1` (district). Rows are validated, deduplicated
//! and linked to their state's region factor, then written in fixed-size batches.

mod normalizer;
mod parser;

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use csv::StringRecord;
use tracing::{error, info, warn};

use crate::config::{RegionImportConfig, DEFAULT_REGION_BATCH_SIZE};

use super::domain::{EntityId, NewRegion, DEFAULT_REGION_STATE};
use super::store::{RegionBulkWriter, RegionFactorRepository, RegionRepository, RepositoryError};

use parser::RegionColumns;

#[derive(Debug)]
pub enum RegionLoadError {
    Io(std::io::Error),
    Csv(csv::Error),
    EmptySource,
    MissingColumn(&'static str),
    MissingDefaultFactor,
    Repository(RepositoryError),
}

impl std::fmt::Display for RegionLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionLoadError::Io(err) => write!(f, "failed to read region data: {}", err),
            RegionLoadError::Csv(err) => write!(f, "invalid region CSV data: {}", err),
            RegionLoadError::EmptySource => write!(f, "region data file is empty"),
            RegionLoadError::MissingColumn(name) => {
                write!(f, "column {} not found in region data header", name)
            }
            RegionLoadError::MissingDefaultFactor => write!(
                f,
                "region factor '{}' is not configured",
                DEFAULT_REGION_STATE
            ),
            RegionLoadError::Repository(err) => write!(f, "could not store regions: {}", err),
        }
    }
}

impl std::error::Error for RegionLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegionLoadError::Io(err) => Some(err),
            RegionLoadError::Csv(err) => Some(err),
            RegionLoadError::Repository(err) => Some(err),
            RegionLoadError::EmptySource
            | RegionLoadError::MissingColumn(_)
            | RegionLoadError::MissingDefaultFactor => None,
        }
    }
}

impl From<std::io::Error> for RegionLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RegionLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for RegionLoadError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

/// Row accounting for a completed import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionLoadReport {
    pub inserted: usize,
    pub batches: usize,
    pub skipped_incomplete: usize,
    pub skipped_short: usize,
    pub skipped_duplicate: usize,
    /// Rows whose state had no factor of its own and were linked to `DEFAULT`.
    pub defaulted: usize,
    /// Rows holding invalid UTF-8; bad bytes were replaced with U+FFFD and the row kept.
    pub lossy_decoded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionLoadOutcome {
    /// The region table already had rows; nothing was read or written.
    AlreadyPopulated { existing: usize },
    Loaded(RegionLoadReport),
}

impl RegionLoadOutcome {
    pub fn inserted(&self) -> usize {
        match self {
            Self::AlreadyPopulated { .. } => 0,
            Self::Loaded(report) => report.inserted,
        }
    }
}

pub struct RegionDataLoader<S: ?Sized> {
    store: Arc<S>,
    batch_size: usize,
}

impl<S> RegionDataLoader<S>
where
    S: RegionRepository + RegionBulkWriter + RegionFactorRepository + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_REGION_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<RegionLoadOutcome, RegionLoadError> {
        if let Some(existing) = self.populated()? {
            return Ok(RegionLoadOutcome::AlreadyPopulated { existing });
        }
        let file = std::fs::File::open(path)?;
        self.load(file).map(RegionLoadOutcome::Loaded)
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<RegionLoadOutcome, RegionLoadError> {
        if let Some(existing) = self.populated()? {
            return Ok(RegionLoadOutcome::AlreadyPopulated { existing });
        }
        self.load(reader).map(RegionLoadOutcome::Loaded)
    }

    fn populated(&self) -> Result<Option<usize>, RegionLoadError> {
        let existing = self.store.region_count()?;
        if existing > 0 {
            info!(existing, "region data already loaded, skipping import");
            return Ok(Some(existing));
        }
        Ok(None)
    }

    fn load<R: Read>(&self, reader: R) -> Result<RegionLoadReport, RegionLoadError> {
        let default_factor = self
            .store
            .region_factor_by_state(DEFAULT_REGION_STATE)?
            .ok_or(RegionLoadError::MissingDefaultFactor)?;

        let factors_by_state: HashMap<String, EntityId> = self
            .store
            .region_factors()?
            .into_iter()
            .filter(|factor| !factor.federal_state.trim().is_empty())
            .map(|factor| (factor.federal_state.to_lowercase(), factor.id))
            .collect();

        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers = StringRecord::from_byte_record_lossy(csv_reader.byte_headers()?.clone());
        if headers.is_empty() {
            return Err(RegionLoadError::EmptySource);
        }
        let columns = RegionColumns::locate(&headers)?;

        let mut report = RegionLoadReport::default();
        let mut seen = HashSet::new();
        let mut batch = Vec::with_capacity(self.batch_size);

        for (index, record) in csv_reader.byte_records().enumerate() {
            let record = record?;
            let line = index + 2;

            if std::str::from_utf8(record.as_slice()).is_err() {
                warn!(line, "row is not valid UTF-8, replacing undecodable bytes");
                report.lossy_decoded += 1;
            }
            let record = StringRecord::from_byte_record_lossy(record);

            let Some(fields) = columns.extract(&record) else {
                warn!(line, columns = record.len(), "skipping row with insufficient columns");
                report.skipped_short += 1;
                continue;
            };

            if !fields.is_complete() {
                warn!(
                    line,
                    state = %fields.federal_state,
                    postal_code = %fields.postal_code,
                    city = %fields.city,
                    "skipping row with blank required fields"
                );
                report.skipped_incomplete += 1;
                continue;
            }

            if !seen.insert(fields.key()) {
                warn!(
                    line,
                    postal_code = %fields.postal_code,
                    district = %fields.district,
                    "skipping duplicate region"
                );
                report.skipped_duplicate += 1;
                continue;
            }

            let factor_id = match factors_by_state.get(&fields.federal_state.to_lowercase()) {
                Some(id) => *id,
                None => {
                    warn!(state = %fields.federal_state, "region factor not found for state, using default");
                    report.defaulted += 1;
                    default_factor.id
                }
            };

            batch.push(fields.into_region(factor_id));
            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut report)?;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &mut report)?;
        }

        info!(
            inserted = report.inserted,
            batches = report.batches,
            skipped_incomplete = report.skipped_incomplete,
            skipped_short = report.skipped_short,
            skipped_duplicate = report.skipped_duplicate,
            defaulted = report.defaulted,
            lossy_decoded = report.lossy_decoded,
            "loaded region data"
        );
        Ok(report)
    }

    fn flush(
        &self,
        batch: &mut Vec<NewRegion>,
        report: &mut RegionLoadReport,
    ) -> Result<(), RegionLoadError> {
        let inserted = match self.store.insert_region_batch(batch) {
            Ok(inserted) => inserted,
            Err(err) => {
                error!(
                    error = %err,
                    committed = report.inserted,
                    rejected = batch.len(),
                    "region batch rolled back"
                );
                return Err(err.into());
            }
        };
        report.inserted += inserted;
        report.batches += 1;
        info!(
            batch = report.batches,
            size = inserted,
            total = report.inserted,
            "inserted region batch"
        );
        batch.clear();
        Ok(())
    }
}

/// First-boot import. Failures are logged and swallowed so the service starts without
/// region data instead of not starting at all.
pub fn bootstrap_regions<S>(store: Arc<S>, config: &RegionImportConfig) -> Option<RegionLoadOutcome>
where
    S: RegionRepository + RegionBulkWriter + RegionFactorRepository + ?Sized,
{
    let loader = RegionDataLoader::new(store).with_batch_size(config.batch_size);
    info!(path = %config.csv_path.display(), batch_size = config.batch_size, "bootstrapping region data");

    match loader.from_path(&config.csv_path) {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            error!(
                path = %config.csv_path.display(),
                error = %err,
                "failed to load region data; postal codes will not resolve"
            );
            None
        }
    }
}
