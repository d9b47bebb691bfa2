use super::common::*;
use rust_decimal_macros::dec;

use crate::rating::{
    ConfigKey, PremiumCalculator, PremiumRequest, RegionRejection, ResolutionError,
};

#[test]
fn premium_multiplies_base_with_all_factors() {
    let (_, service) = standard_service();
    let result = service
        .calculate(&PremiumRequest::new("10115", "Kompaktklasse", 40_000))
        .expect("calculated");

    assert_eq!(result.base_premium, dec!(500.00));
    assert_eq!(result.region_factor, dec!(1.2));
    assert_eq!(result.vehicle_type_factor, dec!(1.0));
    assert_eq!(result.mileage_factor, dec!(1.5));
    assert_eq!(result.premium.to_string(), "900.00");
    assert_eq!(result.postal_code, "10115");
    assert_eq!(result.annual_mileage, 40_000);
}

#[test]
fn rounding_happens_once_on_the_product() {
    let store = empty_store();
    let state = add_region_factor(&store, "Hamburg", dec!(1.0));
    add_regions(&store, &[new_region("Hamburg", "Hamburg", "20095", "Altstadt", state.id)]);
    add_vehicle(&store, "Kombi", dec!(1.0));
    add_mileage(&store, 0, None, dec!(1.0005));

    let calculator = PremiumCalculator::new(store.clone());
    crate::rating::ConfigurationService::new(store)
        .set_value(ConfigKey::BasePremium, "333.33", None)
        .expect("base premium stored");

    let result = calculator
        .calculate(&PremiumRequest::new("20095", "Kombi", 12_000))
        .expect("calculated");
    assert_eq!(result.premium, dec!(333.50));
}

#[test]
fn repeated_calculations_are_identical() {
    let (_, service) = standard_service();
    let request = PremiumRequest::new("10117", "SUV", 12_000);
    let first = service.calculate(&request).expect("first");
    let second = service.calculate(&request).expect("second");
    assert_eq!(first, second);
    assert_eq!(first.premium, dec!(900.00));
}

#[test]
fn region_failure_is_reported_before_other_failures() {
    let (_, service) = standard_service();
    let err = service
        .calculate(&PremiumRequest::new("99999", "Hovercraft", 10_000))
        .expect_err("nothing resolves");
    assert!(matches!(
        err,
        ResolutionError::UnresolvableRegion {
            reason: RegionRejection::NoRegion,
            ..
        }
    ));
}

#[test]
fn vehicle_failure_is_reported_before_mileage_failure() {
    let store = empty_store();
    let state = add_region_factor(&store, "Bremen", dec!(1.0));
    add_regions(&store, &[new_region("Bremen", "Bremen", "28195", "Mitte", state.id)]);
    let calculator = PremiumCalculator::new(store);

    let err = calculator
        .calculate(&PremiumRequest::new("28195", "Hovercraft", 10_000))
        .expect_err("vehicle and mileage unknown");
    assert!(matches!(err, ResolutionError::UnknownVehicleType { .. }));
}

#[test]
fn base_premium_changes_apply_to_next_calculation() {
    let (_, service) = standard_service();
    service
        .settings()
        .set_value(ConfigKey::BasePremium, "750.00", Some("annual review"))
        .expect("stored");

    let result = service
        .calculate(&PremiumRequest::new("10115", "Kompaktklasse", 10_000))
        .expect("calculated");
    assert_eq!(result.base_premium, dec!(750.00));
    assert_eq!(result.premium, dec!(900.00));
}

#[test]
fn region_catalog_lists_only_referenced_factors_by_state() {
    let (_, service) = standard_service();
    let names: Vec<String> = service
        .region_factor_catalog()
        .expect("catalog")
        .into_iter()
        .map(|view| view.name)
        .collect();
    assert_eq!(names, vec!["Bayern", "Berlin", "Thüringen"]);
}

#[test]
fn factor_catalog_renders_mileage_labels_in_ascending_order() {
    let (_, service) = standard_service();
    let catalog = service.all_factors().expect("catalog");

    let labels: Vec<&str> = catalog
        .mileage_factors
        .iter()
        .map(|view| view.name.as_str())
        .collect();
    assert_eq!(
        labels,
        vec!["0-5000 km", "5001-15000 km", "15001-30000 km", "30001+ km"]
    );
    assert_eq!(catalog.vehicle_type_factors.len(), 2);
}

#[test]
fn postcode_searches_project_address_fields() {
    let (_, service) = standard_service();

    let by_prefix = service.find_postcodes_by_prefix("101").expect("search");
    assert_eq!(by_prefix.len(), 3);
    assert!(by_prefix.iter().all(|view| view.federal_state == "Berlin"));

    let by_locality = service.find_postcodes_by_locality("tiergarten").expect("search");
    assert_eq!(by_locality.len(), 1);
    assert_eq!(by_locality[0].postal_code, "10117");
}
