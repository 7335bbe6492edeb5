//! Time-indexed queries against loaded datasets.
//!
//! Two query families:
//!
//! - **Interval containment**: which markers are valid at time `t`
//!   ([active_locations], plus the sweep-based [IntervalSweep] for hosts
//!   querying every frame against large datasets)
//! - **Point lookup**: the aggregate record for the discretized minute of `t`
//!   ([result_at])
//!
//! Both run synchronously within a frame and read the datasets immutably.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::records::{MarkerRecord, ResultRecord};

/// Locations of every marker whose closed validity interval `[start, end]`
/// contains `t`, in input order. Full linear scan; empty input or a `t`
/// outside every interval simply yield an empty vector.
pub fn active_locations<'a>(records: &'a [MarkerRecord], t: f64) -> Vec<&'a [f64]> {
    records
        .iter()
        .filter(|record| record.start() <= t && t <= record.end())
        .map(|record| record.location.as_slice())
        .collect()
}

/// The aggregate record for the discretized minute of `t`, if the sparse
/// dataset has one.
///
/// `t` is truncated toward zero before comparison; the record's `time` field
/// is compared as a number. Ties resolve to the first match in sequence
/// order. No match is a normal outcome, not an error.
pub fn result_at(records: &[ResultRecord], t: f64) -> Option<&ResultRecord> {
    let minute = t.trunc();
    records.iter().find(|record| record.time == minute)
}

/// Sweep-based interval index for per-frame queries.
///
/// The linear scan above revisits every record once per query. While playback
/// advances monotonically the sweep instead admits records as their start
/// times pass and retires them as their end times pass, so a frame costs only
/// the records whose state changed since the previous frame plus the active
/// set. A backward scrub transparently rebuilds the cursor state.
///
/// Functionally equivalent to [active_locations] for any query sequence.
#[derive(Debug, Clone)]
pub struct IntervalSweep {
    /// `(start, record index)` ascending by start.
    starts: Vec<(f64, usize)>,
    /// `(end, record index)` ascending by end.
    ends: Vec<(f64, usize)>,
    next_start: usize,
    next_end: usize,
    /// Active record indices; BTreeSet iteration restores input order.
    active: BTreeSet<usize>,
    cursor: Option<f64>,
    record_count: usize,
}

impl IntervalSweep {
    pub fn new(records: &[MarkerRecord]) -> Self {
        let mut starts: Vec<(f64, usize)> = records
            .iter()
            .enumerate()
            .map(|(index, record)| (record.start(), index))
            .collect();
        starts.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut ends: Vec<(f64, usize)> = records
            .iter()
            .enumerate()
            .map(|(index, record)| (record.end(), index))
            .collect();
        ends.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        Self {
            starts,
            ends,
            next_start: 0,
            next_end: 0,
            active: BTreeSet::new(),
            cursor: None,
            record_count: records.len(),
        }
    }

    /// Locations of every record active at `t`, in input order.
    ///
    /// `records` must be the same slice the sweep was built from.
    pub fn active_at<'a>(&mut self, records: &'a [MarkerRecord], t: f64) -> Vec<&'a [f64]> {
        debug_assert_eq!(
            records.len(),
            self.record_count,
            "sweep queried against a different dataset than it was built from"
        );

        if self.cursor.map_or(false, |previous| t < previous) {
            self.rewind();
        }
        self.cursor = Some(t);

        while self
            .starts
            .get(self.next_start)
            .map_or(false, |&(start, _)| start <= t)
        {
            self.active.insert(self.starts[self.next_start].1);
            self.next_start += 1;
        }
        while self
            .ends
            .get(self.next_end)
            .map_or(false, |&(end, _)| end < t)
        {
            self.active.remove(&self.ends[self.next_end].1);
            self.next_end += 1;
        }

        self.active
            .iter()
            .map(|&index| records[index].location.as_slice())
            .collect()
    }

    fn rewind(&mut self) {
        self.next_start = 0;
        self.next_end = 0;
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(lon: f64, lat: f64, start: f64, end: f64) -> MarkerRecord {
        MarkerRecord {
            location: vec![lon, lat],
            timestamp: [start, end],
        }
    }

    fn result(time: f64, driving: u64) -> ResultRecord {
        ResultRecord {
            time,
            driving_vehicle_num: driving,
            empty_vehicle_num: 0,
            waiting_passenger_num: 0,
            average_waiting_time: None,
            fail_passenger_cum: 0,
        }
    }

    #[test]
    fn containment_is_closed_on_both_ends() {
        let records = vec![marker(127.1, 37.4, 1400.0, 1410.0)];
        assert_eq!(active_locations(&records, 1400.0).len(), 1);
        assert_eq!(active_locations(&records, 1410.0).len(), 1);
        assert_eq!(active_locations(&records, 1405.5).len(), 1);
        assert!(active_locations(&records, 1399.999).is_empty());
        assert!(active_locations(&records, 1410.001).is_empty());
    }

    #[test]
    fn point_interval_is_active_exactly_at_its_instant() {
        let records = vec![marker(127.1, 37.4, 1380.0, 1380.0)];
        assert_eq!(active_locations(&records, 1380.0).len(), 1);
        assert!(active_locations(&records, 1381.0).is_empty());
    }

    #[test]
    fn active_locations_preserve_input_order() {
        let records = vec![
            marker(1.0, 1.0, 1400.0, 1500.0),
            marker(2.0, 2.0, 1300.0, 1450.0),
            marker(3.0, 3.0, 1420.0, 1430.0),
        ];
        let active = active_locations(&records, 1425.0);
        let longitudes: Vec<f64> = active.iter().map(|loc| loc[0]).collect();
        assert_eq!(longitudes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_input_and_out_of_range_queries_yield_empty() {
        assert!(active_locations(&[], 1400.0).is_empty());
        let records = vec![marker(127.1, 37.4, 1400.0, 1410.0)];
        assert!(active_locations(&records, 0.0).is_empty());
    }

    #[test]
    fn result_lookup_truncates_toward_zero() {
        let records = vec![result(1400.0, 3)];
        assert_eq!(result_at(&records, 1400.9).map(|r| r.driving_vehicle_num), Some(3));
        assert!(result_at(&records, 1401.0).is_none());
        assert!(result_at(&records, 1399.999).is_none());
    }

    #[test]
    fn result_lookup_returns_first_match_in_sequence_order() {
        let records = vec![result(1400.0, 1), result(1400.0, 2)];
        assert_eq!(result_at(&records, 1400.2).map(|r| r.driving_vehicle_num), Some(1));
    }

    #[test]
    fn result_lookup_on_empty_dataset_is_not_found() {
        assert!(result_at(&[], 1400.0).is_none());
    }

    #[test]
    fn sweep_matches_linear_scan_while_advancing() {
        let records = vec![
            marker(1.0, 1.0, 1380.0, 1390.0),
            marker(2.0, 2.0, 1385.0, 1385.0),
            marker(3.0, 3.0, 1383.0, 1395.0),
            marker(4.0, 4.0, 1391.0, 1392.0),
        ];
        let mut sweep = IntervalSweep::new(&records);
        let mut t = 1378.0;
        while t <= 1397.0 {
            assert_eq!(sweep.active_at(&records, t), active_locations(&records, t), "t = {t}");
            t += 0.5;
        }
    }

    #[test]
    fn sweep_rebuilds_after_backward_scrub() {
        let records = vec![
            marker(1.0, 1.0, 1380.0, 1390.0),
            marker(2.0, 2.0, 1388.0, 1400.0),
        ];
        let mut sweep = IntervalSweep::new(&records);
        assert_eq!(sweep.active_at(&records, 1395.0).len(), 1);
        // Scrub backwards to a time before the first record retired.
        assert_eq!(sweep.active_at(&records, 1385.0), active_locations(&records, 1385.0));
        assert_eq!(sweep.active_at(&records, 1389.0), active_locations(&records, 1389.0));
    }

    #[test]
    fn sweep_matches_linear_scan_on_seeded_random_intervals() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let records: Vec<MarkerRecord> = (0..200)
            .map(|i| {
                let start = 1380.0 + rng.gen_range(0.0..180.0);
                let span = rng.gen_range(0.0..30.0);
                marker(i as f64, -(i as f64), start, start + span)
            })
            .collect();

        let mut sweep = IntervalSweep::new(&records);
        let mut queries: Vec<f64> = (0..300).map(|_| 1375.0 + rng.gen_range(0.0..190.0)).collect();
        queries.sort_by(|a, b| a.partial_cmp(b).unwrap());
        // A couple of backward jumps exercise the rewind path.
        queries.insert(150, 1380.5);
        queries.push(1379.0);

        for t in queries {
            assert_eq!(sweep.active_at(&records, t), active_locations(&records, t), "t = {t}");
        }
    }
}
