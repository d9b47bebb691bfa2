use super::common::*;
use rust_decimal_macros::dec;

use crate::rating::{RateResolver, RegionRejection, ResolutionError};

#[test]
fn single_region_resolves_to_its_state_factor() {
    let resolver = RateResolver::new(standard_store());
    assert_eq!(resolver.resolve_region_factor("10115").expect("resolves"), dec!(1.2));
}

#[test]
fn districts_of_one_state_share_the_state_factor() {
    let resolver = RateResolver::new(standard_store());
    let factor = resolver.resolve_region("10117").expect("resolves");
    assert_eq!(factor.federal_state, "Berlin");
    assert_eq!(factor.factor, dec!(1.2));
}

#[test]
fn postal_code_straddling_states_is_rejected() {
    let resolver = RateResolver::new(standard_store());
    match resolver.resolve_region_factor("07919") {
        Err(ResolutionError::UnresolvableRegion {
            postal_code,
            reason: RegionRejection::SpansStates(states),
        }) => {
            assert_eq!(postal_code, "07919");
            assert_eq!(states, vec!["Bayern".to_string(), "Thüringen".to_string()]);
        }
        other => panic!("expected ambiguous region, got {other:?}"),
    }
}

#[test]
fn unknown_postal_code_names_the_value() {
    let resolver = RateResolver::new(standard_store());
    let err = resolver.resolve_region_factor("99999").expect_err("no region");
    assert!(matches!(
        err,
        ResolutionError::UnresolvableRegion {
            reason: RegionRejection::NoRegion,
            ..
        }
    ));
    assert!(err.to_string().contains("postal code: 99999"));
}

#[test]
fn vehicle_lookup_is_exact_and_case_sensitive() {
    let resolver = RateResolver::new(standard_store());
    assert_eq!(resolver.resolve_vehicle_factor("SUV").expect("known"), dec!(1.5));

    let err = resolver.resolve_vehicle_factor("suv").expect_err("case differs");
    assert_eq!(err.to_string(), "Unknown vehicle type: suv");
}

#[test]
fn mileage_boundaries_are_inclusive() {
    let store = empty_store();
    add_mileage(&store, 0, Some(5000), dec!(0.8));
    add_mileage(&store, 5001, Some(15000), dec!(1.0));
    let resolver = RateResolver::new(store);

    assert_eq!(resolver.resolve_mileage_factor(5000).expect("first"), dec!(0.8));
    assert_eq!(resolver.resolve_mileage_factor(5001).expect("second"), dec!(1.0));
    assert!(matches!(
        resolver.resolve_mileage_factor(15001),
        Err(ResolutionError::UnresolvableMileage { mileage: 15001 })
    ));
}

#[test]
fn overlapping_ranges_prefer_highest_minimum() {
    let store = empty_store();
    add_mileage(&store, 0, Some(20000), dec!(0.9));
    add_mileage(&store, 10000, Some(30000), dec!(1.2));
    let resolver = RateResolver::new(store);

    assert_eq!(resolver.resolve_mileage_factor(15000).expect("covered"), dec!(1.2));
    assert_eq!(resolver.resolve_mileage_factor(5000).expect("covered"), dec!(0.9));
}

#[test]
fn equal_minimums_fall_back_to_earliest_range() {
    let store = empty_store();
    let first = add_mileage(&store, 10000, Some(20000), dec!(1.1));
    add_mileage(&store, 10000, Some(30000), dec!(1.3));
    let resolver = RateResolver::new(store);

    let chosen = resolver.resolve_mileage_range(15000).expect("covered");
    assert_eq!(chosen.id, first.id);
    assert_eq!(chosen.factor, dec!(1.1));
}

#[test]
fn unbounded_range_covers_very_high_mileage() {
    let store = empty_store();
    add_mileage(&store, 30001, None, dec!(1.5));
    let resolver = RateResolver::new(store);
    assert_eq!(resolver.resolve_mileage_factor(1_000_000).expect("covered"), dec!(1.5));
}
