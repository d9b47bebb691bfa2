//! Tunable rating configuration backed by the key/value table.
//!
//! Only keys named by [`ConfigKey`] can be read or written; anything else is rejected
//! while parsing the key, before the store is touched.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::{ConfigurationRepository, RepositoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigKey {
    #[serde(rename = "BASE_PREMIUM")]
    BasePremium,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 1] = [ConfigKey::BasePremium];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BasePremium => "BASE_PREMIUM",
        }
    }

    pub const fn default_value(self) -> &'static str {
        match self {
            Self::BasePremium => "500.00",
        }
    }

    pub const fn default_description(self) -> &'static str {
        match self {
            Self::BasePremium => "Base premium amount in EUR for insurance calculations",
        }
    }

    fn validate(self, value: &str) -> Result<(), SettingsError> {
        match self {
            Self::BasePremium => Decimal::from_str(value.trim())
                .map(|_| ())
                .map_err(|_| SettingsError::InvalidValue {
                    key: self,
                    value: value.to_string(),
                }),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == raw)
            .ok_or_else(|| SettingsError::KeyNotAllowed(raw.to_string()))
    }
}

fn default_base_premium() -> Decimal {
    Decimal::new(50_000, 2)
}

/// Stored configuration value plus its bookkeeping columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationEntry {
    pub key: ConfigKey,
    pub value: String,
    pub description: Option<String>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration key '{0}' is not allowed")]
    KeyNotAllowed(String),
    #[error("invalid value '{value}' for configuration key {key}")]
    InvalidValue { key: ConfigKey, value: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Read/write access to the allow-listed configuration keys.
pub struct ConfigurationService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ConfigurationService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ConfigurationService<S>
where
    S: ConfigurationRepository + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn get_value(&self, key: ConfigKey, default: &str) -> Result<String, SettingsError> {
        Ok(self
            .store
            .configuration(key)?
            .map(|entry| entry.value)
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn get(&self, key: ConfigKey) -> Result<Option<ConfigurationEntry>, SettingsError> {
        Ok(self.store.configuration(key)?)
    }

    pub fn list(&self) -> Result<Vec<ConfigurationEntry>, SettingsError> {
        Ok(self.store.configurations()?)
    }

    /// Creates the entry on first write; later writes replace value and timestamp only.
    pub fn set_value(
        &self,
        key: ConfigKey,
        value: &str,
        description: Option<&str>,
    ) -> Result<ConfigurationEntry, SettingsError> {
        key.validate(value)?;

        let now = Utc::now();
        let entry = match self.store.configuration(key)? {
            Some(mut existing) => {
                existing.value = value.trim().to_string();
                existing.last_modified = now;
                existing
            }
            None => ConfigurationEntry {
                key,
                value: value.trim().to_string(),
                description: description.map(str::to_string),
                last_modified: now,
            },
        };

        let saved = self.store.save_configuration(entry)?;
        info!(key = %saved.key, value = %saved.value, "updated configuration");
        Ok(saved)
    }

    /// Base premium, or `500.00` when nothing usable is stored.
    pub fn base_premium(&self) -> Result<Decimal, SettingsError> {
        let key = ConfigKey::BasePremium;
        let raw = self.get_value(key, key.default_value())?;

        match Decimal::from_str(raw.trim()) {
            Ok(amount) => Ok(amount),
            Err(err) => {
                warn!(value = %raw, error = %err, "stored base premium is not a decimal, using default");
                Ok(default_base_premium())
            }
        }
    }

    pub fn set_base_premium(&self, amount: Decimal) -> Result<ConfigurationEntry, SettingsError> {
        let key = ConfigKey::BasePremium;
        self.set_value(key, &amount.to_string(), Some(key.default_description()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::memory::InMemoryRatingStore;
    use rust_decimal_macros::dec;

    fn service() -> (Arc<InMemoryRatingStore>, ConfigurationService<InMemoryRatingStore>) {
        let store = Arc::new(InMemoryRatingStore::default());
        (store.clone(), ConfigurationService::new(store))
    }

    #[test]
    fn base_premium_defaults_when_absent() {
        let (_, settings) = service();
        assert_eq!(settings.base_premium().expect("readable"), dec!(500.00));
    }

    #[test]
    fn typed_default_matches_declared_default() {
        assert_eq!(
            default_base_premium().to_string(),
            ConfigKey::BasePremium.default_value()
        );
    }

    #[test]
    fn base_premium_reflects_latest_write() {
        let (_, settings) = service();
        settings
            .set_value(ConfigKey::BasePremium, "750.00", Some("quarterly review"))
            .expect("write accepted");
        assert_eq!(settings.base_premium().expect("readable"), dec!(750.00));
    }

    #[test]
    fn update_keeps_original_description() {
        let (_, settings) = service();
        let created = settings
            .set_value(ConfigKey::BasePremium, "600.00", Some("initial"))
            .expect("created");
        let updated = settings
            .set_value(ConfigKey::BasePremium, "650.00", Some("ignored on update"))
            .expect("updated");

        assert_eq!(updated.description.as_deref(), Some("initial"));
        assert_eq!(updated.value, "650.00");
        assert!(updated.last_modified >= created.last_modified);
        assert_eq!(settings.list().expect("listable").len(), 1);
    }

    #[test]
    fn unknown_keys_are_rejected_while_parsing() {
        match "MAX_DISCOUNT".parse::<ConfigKey>() {
            Err(SettingsError::KeyNotAllowed(key)) => assert_eq!(key, "MAX_DISCOUNT"),
            other => panic!("expected key rejection, got {other:?}"),
        }
        assert_eq!(
            "BASE_PREMIUM".parse::<ConfigKey>().expect("allowed"),
            ConfigKey::BasePremium
        );
    }

    #[test]
    fn non_decimal_base_premium_is_rejected_before_write() {
        let (store, settings) = service();
        let err = settings
            .set_value(ConfigKey::BasePremium, "five hundred", None)
            .expect_err("rejected");
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(store
            .configuration(ConfigKey::BasePremium)
            .expect("readable")
            .is_none());
    }

    #[test]
    fn corrupt_stored_value_falls_back_to_default() {
        let (store, settings) = service();
        store
            .save_configuration(ConfigurationEntry {
                key: ConfigKey::BasePremium,
                value: "n/a".to_string(),
                description: None,
                last_modified: Utc::now(),
            })
            .expect("raw write");
        assert_eq!(settings.base_premium().expect("readable"), dec!(500.00));
    }

    #[test]
    fn set_base_premium_uses_typed_amount() {
        let (_, settings) = service();
        let entry = settings.set_base_premium(dec!(812.50)).expect("written");
        assert_eq!(entry.value, "812.50");
        assert_eq!(
            entry.description.as_deref(),
            Some(ConfigKey::BasePremium.default_description())
        );
    }
}
