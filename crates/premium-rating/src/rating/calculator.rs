use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::resolver::{RateResolver, ResolutionError};
use super::settings::ConfigurationService;
use super::store::RatingStore;

/// Raw calculation input as received from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumRequest {
    pub postal_code: String,
    pub vehicle_type: String,
    pub annual_mileage: u32,
}

impl PremiumRequest {
    pub fn new(
        postal_code: impl Into<String>,
        vehicle_type: impl Into<String>,
        annual_mileage: u32,
    ) -> Self {
        Self {
            postal_code: postal_code.into(),
            vehicle_type: vehicle_type.into(),
            annual_mileage,
        }
    }
}

/// Input echo plus every factor that went into the premium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub postal_code: String,
    pub vehicle_type: String,
    pub annual_mileage: u32,
    pub base_premium: Decimal,
    pub mileage_factor: Decimal,
    pub vehicle_type_factor: Decimal,
    pub region_factor: Decimal,
    pub premium: Decimal,
}

/// `base × region × vehicle × mileage`, rounded once to cents (half-up).
///
/// Returns `None` if the product does not fit a `Decimal`.
pub fn premium_for(
    base_premium: Decimal,
    region_factor: Decimal,
    vehicle_factor: Decimal,
    mileage_factor: Decimal,
) -> Option<Decimal> {
    let product = base_premium
        .checked_mul(region_factor)?
        .checked_mul(vehicle_factor)?
        .checked_mul(mileage_factor)?;

    let mut premium = product.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    premium.rescale(2);
    Some(premium)
}

/// Stateless premium computation over the current store contents.
///
/// Factors are resolved in a fixed order (region, vehicle, mileage) so the first
/// failure reported is deterministic when several inputs are invalid.
pub struct PremiumCalculator<S: ?Sized> {
    resolver: RateResolver<S>,
    settings: ConfigurationService<S>,
}

impl<S: ?Sized> Clone for PremiumCalculator<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<S> PremiumCalculator<S>
where
    S: RatingStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            resolver: RateResolver::new(Arc::clone(&store)),
            settings: ConfigurationService::new(store),
        }
    }

    pub fn resolver(&self) -> &RateResolver<S> {
        &self.resolver
    }

    pub fn calculate(&self, request: &PremiumRequest) -> Result<CalculationResult, ResolutionError> {
        let base_premium = self.settings.base_premium()?;
        let region_factor = self.resolver.resolve_region_factor(&request.postal_code)?;
        let vehicle_type_factor = self.resolver.resolve_vehicle_factor(&request.vehicle_type)?;
        let mileage_factor = self.resolver.resolve_mileage_factor(request.annual_mileage)?;

        let premium = premium_for(
            base_premium,
            region_factor,
            vehicle_type_factor,
            mileage_factor,
        )
        .ok_or(ResolutionError::PremiumOverflow)?;

        debug!(
            %premium,
            %base_premium,
            %region_factor,
            %vehicle_type_factor,
            %mileage_factor,
            "combined factors"
        );

        Ok(CalculationResult {
            postal_code: request.postal_code.clone(),
            vehicle_type: request.vehicle_type.clone(),
            annual_mileage: request.annual_mileage,
            base_premium,
            mileage_factor,
            vehicle_type_factor,
            region_factor,
            premium,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn exact_products_keep_two_decimals() {
        let premium = premium_for(dec!(500.00), dec!(1.2), dec!(1.0), dec!(1.5)).expect("fits");
        assert_eq!(premium, dec!(900.00));
        assert_eq!(premium.to_string(), "900.00");
    }

    #[test]
    fn rounding_applies_once_to_the_final_product() {
        let premium = premium_for(dec!(333.33), dec!(1.0), dec!(1.0), dec!(1.0005)).expect("fits");
        assert_eq!(premium, dec!(333.50));

        let round = |value: Decimal| {
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };
        let per_step = round(round(round(dec!(333.33) * dec!(1.0)) * dec!(1.0)) * round(dec!(1.0005)));
        assert_eq!(per_step, dec!(333.33));
        assert_ne!(premium, per_step);
    }

    #[test]
    fn midpoints_round_half_up() {
        assert_eq!(
            premium_for(dec!(100.005), dec!(1), dec!(1), dec!(1)).expect("fits"),
            dec!(100.01)
        );
        assert_eq!(
            premium_for(dec!(100.004), dec!(1), dec!(1), dec!(1)).expect("fits"),
            dec!(100.00)
        );
    }

    #[test]
    fn integral_inputs_are_rendered_with_cents() {
        let premium = premium_for(dec!(500), dec!(1), dec!(2), dec!(1)).expect("fits");
        assert_eq!(premium.to_string(), "1000.00");
    }

    #[test]
    fn overflowing_product_is_reported() {
        assert!(premium_for(Decimal::MAX, dec!(2), dec!(1), dec!(1)).is_none());
    }
}
