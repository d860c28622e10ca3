//! Property-based tests for timestamps and request validation
//!
//! These tests use proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use trimet::{ArrivalsRequest, BoundingBox, GeoPoint, StopsRequest, TrimetTime, Validate};

// ============================================================================
// TrimetTime Property Tests
// ============================================================================

mod trimet_time_tests {
    use super::*;

    // 2000-01-01 through 2037-12-31
    const MIN_MILLIS: i64 = 946_684_800_000;
    const MAX_MILLIS: i64 = 2_145_916_800_000;

    proptest! {
        #[test]
        fn display_parses_to_same_instant(millis in MIN_MILLIS..MAX_MILLIS) {
            let time = TrimetTime::from_millis(millis).unwrap();
            let reparsed: TrimetTime = time.to_string().parse().unwrap();
            prop_assert_eq!(reparsed.timestamp_millis(), millis);
        }

        #[test]
        fn display_uses_pacific_offset(millis in MIN_MILLIS..MAX_MILLIS) {
            let text = TrimetTime::from_millis(millis).unwrap().to_string();
            prop_assert!(text.ends_with("-0800") || text.ends_with("-0700"), "{}", text);
        }

        #[test]
        fn january_times_are_standard_time(
            day in 1u32..=31,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
            millis in 0u32..1000
        ) {
            let input = format!("2014-01-{day:02}T{hour:02}:{minute:02}:{second:02}.{millis:03}-0800");
            let time = TrimetTime::parse(&input).unwrap();
            prop_assert_eq!(time.to_string(), input);
        }

        #[test]
        fn offset_less_input_is_pacific_local(
            day in 1u32..=31,
            hour in 0u32..24,
            minute in 0u32..60
        ) {
            let naive = format!("2014-07-{day:02}T{hour:02}:{minute:02}:00");
            let time = TrimetTime::parse(&naive).unwrap();
            prop_assert_eq!(time.to_string(), format!("{naive}.000-0700"));
        }

        #[test]
        fn ordering_matches_instants(a in MIN_MILLIS..MAX_MILLIS, b in MIN_MILLIS..MAX_MILLIS) {
            let ta = TrimetTime::from_millis(a).unwrap();
            let tb = TrimetTime::from_millis(b).unwrap();
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
        }
    }
}

// ============================================================================
// Request Validation Property Tests
// ============================================================================

mod request_tests {
    use super::*;

    proptest! {
        #[test]
        fn arrivals_accepts_one_to_ten_ids(ids in prop::collection::vec(1u32..100_000, 1..=10)) {
            prop_assert!(ArrivalsRequest::new(ids).validate().is_ok());
        }

        #[test]
        fn arrivals_rejects_more_than_ten_ids(ids in prop::collection::vec(1u32..100_000, 11..30)) {
            prop_assert!(ArrivalsRequest::new(ids).validate().is_err());
        }

        #[test]
        fn radius_search_with_valid_center_is_valid(
            lon in -180.0f64..=180.0f64,
            lat in -90.0f64..=90.0f64,
            feet in 1u32..10_000
        ) {
            let request = StopsRequest::within_feet(GeoPoint::new(lon, lat), feet);
            prop_assert!(request.validate().is_ok());
        }

        #[test]
        fn radius_search_rejects_invalid_latitude(
            lon in -180.0f64..=180.0f64,
            lat in prop_oneof![(-1000.0f64..-90.1f64), (90.1f64..1000.0f64)]
        ) {
            let request = StopsRequest::within_meters(GeoPoint::new(lon, lat), 100);
            prop_assert!(request.validate().is_err());
        }

        #[test]
        fn bounding_box_text_parses_back(
            lon_min in -180.0f64..0.0f64,
            lat_min in -90.0f64..0.0f64,
            lon_max in 0.0f64..=180.0f64,
            lat_max in 0.0f64..=90.0f64
        ) {
            let text = format!("{lon_min},{lat_min},{lon_max},{lat_max}");
            let bbox: BoundingBox = text.parse().unwrap();
            prop_assert_eq!(bbox, BoundingBox::new(lon_min, lat_min, lon_max, lat_max));
            prop_assert!(StopsRequest::in_box(bbox).validate().is_ok());
        }
    }
}
