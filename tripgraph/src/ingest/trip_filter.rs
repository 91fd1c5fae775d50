use std::collections::HashSet;

use super::TripRecord;

/// TLC zone ids for the Bronx. Trips are kept only when both endpoints fall
/// inside this borough.
pub const BRONX_ZONES: [i64; 43] = [
    3, 18, 20, 31, 32, 46, 47, 51, 58, 59, 60, 69, 78, 81, 94, 119, 126, 136, 147, 159, 167, 168,
    169, 174, 182, 183, 184, 185, 199, 200, 208, 212, 213, 220, 235, 240, 241, 242, 247, 248, 250,
    254, 259,
];

/// Row predicate applied between the parquet read and the CSV write. A row
/// passes only when both zones are members of the allow-list, the distance
/// exceeds `min_distance` and the fare exceeds `min_fare` (strict
/// inequalities on both thresholds).
#[derive(Debug, Clone)]
pub struct TripFilter {
    zones: HashSet<i64>,
    min_distance: f64,
    min_fare: f64,
}

impl Default for TripFilter {
    fn default() -> Self {
        Self::bronx()
    }
}

impl TripFilter {
    pub fn new(zones: &[i64], min_distance: f64, min_fare: f64) -> Self {
        Self {
            zones: zones.iter().copied().collect(),
            min_distance,
            min_fare,
        }
    }

    pub fn bronx() -> Self {
        Self::new(&BRONX_ZONES, 0.1, 2.5)
    }

    pub fn matches(&self, trip: &TripRecord) -> bool {
        self.zones.contains(&trip.pickup_zone)
            && self.zones.contains(&trip.dropoff_zone)
            && trip.trip_distance > self.min_distance
            && trip.fare_amount > self.min_fare
    }

    pub fn apply(&self, trips: Vec<TripRecord>) -> Vec<TripRecord> {
        trips.into_iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::{TripFilter, BRONX_ZONES};
    use crate::ingest::TripRecord;

    fn trip(pickup_zone: i64, dropoff_zone: i64, distance: f64, fare: f64) -> TripRecord {
        let dt = NaiveDate::from_ymd_opt(2022, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        TripRecord {
            pickup_datetime: dt,
            dropoff_datetime: dt,
            pickup_zone,
            dropoff_zone,
            trip_distance: distance,
            fare_amount: fare,
        }
    }

    #[test]
    fn test_allow_list_has_43_distinct_zones() {
        let distinct: std::collections::HashSet<i64> = BRONX_ZONES.iter().copied().collect();
        assert_eq!(distinct.len(), 43);
    }

    #[test]
    fn test_both_zones_must_be_in_the_allow_list() {
        let filter = TripFilter::bronx();
        assert!(filter.matches(&trip(3, 18, 1.2, 10.0)));
        // zone 1 (EWR) is outside the borough
        assert!(!filter.matches(&trip(1, 18, 1.2, 10.0)));
        assert!(!filter.matches(&trip(3, 1, 1.2, 10.0)));
        assert!(!filter.matches(&trip(1, 2, 1.2, 10.0)));
    }

    #[test]
    fn test_distance_and_fare_thresholds_are_strict() {
        let filter = TripFilter::bronx();
        assert!(!filter.matches(&trip(3, 18, 0.1, 10.0)));
        assert!(!filter.matches(&trip(3, 18, 0.05, 10.0)));
        assert!(!filter.matches(&trip(3, 18, 1.2, 2.5)));
        assert!(!filter.matches(&trip(3, 18, 1.2, -4.0)));
        assert!(filter.matches(&trip(3, 18, 0.11, 2.51)));
    }

    #[test]
    fn test_thresholds_exclude_rows_regardless_of_zones() {
        let filter = TripFilter::bronx();
        // valid zone pair but degenerate distance
        assert!(!filter.matches(&trip(240, 241, 0.0, 52.0)));
    }

    #[test]
    fn test_apply_retains_only_matching_rows() {
        let filter = TripFilter::bronx();
        let trips = vec![
            trip(3, 18, 1.2, 10.0),
            trip(4, 18, 1.2, 10.0),
            trip(18, 3, 5.0, 22.0),
            trip(18, 3, 5.0, 1.0),
        ];
        let kept = filter.apply(trips);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|t| filter.matches(t)));
    }
}
