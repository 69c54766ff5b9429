/// Date-alignment and correlation integration tests.
///
/// The engines align return series by (symbol, date) inner join before
/// correlating or regressing against factor ETFs — a single mismatched
/// trading day between two symbols' histories would otherwise shift one
/// series relative to the other and silently corrupt every downstream
/// number. This is a binary crate (no lib target), so these tests
/// re-implement the alignment/correlation contract at arm's length rather
/// than importing internals, the way the project's existing integration
/// tests already do.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Day(i32);

fn align_by_date(a: &[(Day, f64)], b: &[(Day, f64)]) -> Vec<(f64, f64)> {
    let a_map: BTreeMap<Day, f64> = a.iter().copied().collect();
    let b_map: BTreeMap<Day, f64> = b.iter().copied().collect();
    a_map
        .into_iter()
        .filter_map(|(day, a_val)| b_map.get(&day).map(|&b_val| (a_val, b_val)))
        .collect()
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let mean_a = pairs.iter().map(|(a, _)| a).sum::<f64>() / n as f64;
    let mean_b = pairs.iter().map(|(_, b)| b).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (a, b) in pairs {
        let da = a - mean_a;
        let db = b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

#[test]
fn alignment_drops_dates_missing_from_either_series() {
    let spy = vec![(Day(1), 0.01), (Day(2), 0.02), (Day(3), -0.01)];
    // AAPL is missing day 2 (e.g. a halted trade) and has an extra day 4
    let aapl = vec![(Day(1), 0.015), (Day(3), -0.02), (Day(4), 0.03)];

    let aligned = align_by_date(&spy, &aapl);

    assert_eq!(aligned.len(), 2);
    assert!(aligned.contains(&(0.01, 0.015)));
    assert!(aligned.contains(&(-0.01, -0.02)));
}

#[test]
fn alignment_of_disjoint_calendars_is_empty() {
    let spy = vec![(Day(1), 0.01), (Day(2), 0.02)];
    let qqq = vec![(Day(10), 0.03), (Day(11), 0.04)];
    assert!(align_by_date(&spy, &qqq).is_empty());
}

#[test]
fn perfectly_correlated_series_round_to_one() {
    let pairs: Vec<(f64, f64)> = (0..30).map(|i| (i as f64, i as f64 * 2.0 + 1.0)).collect();
    let corr = pearson(&pairs).unwrap();
    assert!((corr - 1.0).abs() < 1e-9);
}

#[test]
fn inversely_correlated_series_round_to_negative_one() {
    let pairs: Vec<(f64, f64)> = (0..30).map(|i| (i as f64, -(i as f64))).collect();
    let corr = pearson(&pairs).unwrap();
    assert!((corr + 1.0).abs() < 1e-9);
}

#[test]
fn zero_variance_series_has_no_defined_correlation() {
    // A symbol with flat returns over the window (e.g. an illiquid bond ETF)
    // must not produce a divide-by-zero correlation.
    let pairs: Vec<(f64, f64)> = (0..10).map(|i| (0.0, i as f64)).collect();
    assert_eq!(pearson(&pairs), None);
}

#[test]
fn fewer_than_two_aligned_points_is_not_a_correlation() {
    let spy = vec![(Day(1), 0.01)];
    let aapl = vec![(Day(1), 0.02)];
    let aligned = align_by_date(&spy, &aapl);
    assert_eq!(pearson(&aligned), None);
}
