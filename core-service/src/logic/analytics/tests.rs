use super::*;
use crate::logic::dataset::LabeledRecord;

fn repeat(records: &mut Vec<LabeledRecord>, fingerprint: &str, blood: &str, n: usize) {
    for _ in 0..n {
        records.push(LabeledRecord::new(fingerprint, blood));
    }
}

/// arc/A+ 10, whorl/A+ 5, whorl/O- 5, loop/O- 10
fn scenario() -> Vec<LabeledRecord> {
    let mut records = Vec::new();
    repeat(&mut records, "arc", "A+", 10);
    repeat(&mut records, "whorl", "A+", 5);
    repeat(&mut records, "whorl", "O-", 5);
    repeat(&mut records, "loop", "O-", 10);
    records
}

#[test]
fn test_end_to_end_scenario() {
    let report = analyze(&scenario(), &AnalysisOptions::default()).unwrap();

    let counts = report.contingency.counts();
    assert_eq!(counts.rows(), &["arc", "loop", "whorl"]);
    assert_eq!(counts.cols(), &["A+", "O-"]);
    assert_eq!(counts.get_by_label("arc", "O-"), Some(&0));
    assert_eq!(counts.get_by_label("loop", "O-"), Some(&10));

    assert_eq!(report.expected.get_by_label("arc", "A+"), Some(&5.0));
    assert!((report.chi_square.chi2 - 20.0).abs() < 1e-9);
    assert_eq!(report.chi_square.dof, 2);
    assert!((report.chi_square.p - (-10.0f64).exp()).abs() < 1e-9);

    assert_eq!(report.log_odds.get_by_label("arc", "O-"), Some(&None));
    let arc_a = report.log_odds.get_by_label("arc", "A+").unwrap().unwrap();
    assert!((arc_a - 0.5f64.ln()).abs() < 1e-12);

    let residual = report.residuals.get_by_label("arc", "A+").unwrap().unwrap();
    assert!((residual - 5.0f64.sqrt()).abs() < 1e-12);
    assert!(!report.undefined_cells);
}

#[test]
fn test_scenario_correlation() {
    let report = analyze(&scenario(), &AnalysisOptions::default()).unwrap();

    // codes arc=0 loop=1 whorl=2, A+=0 O-=1 → r = 5 / sqrt(20 · 7.5)
    let r = report.correlation.get(0, 1).unwrap();
    assert!((r - 1.0 / 6.0f64.sqrt()).abs() < 1e-12);
    assert_eq!(report.correlation.get(0, 1), report.correlation.get(1, 0));
}

#[test]
fn test_tables_share_axes() {
    let report = analyze(&scenario(), &AnalysisOptions::default()).unwrap();
    let rows = report.contingency.counts().rows();
    let cols = report.contingency.counts().cols();

    for (r, c) in [
        (report.expected.rows(), report.expected.cols()),
        (report.residuals.rows(), report.residuals.cols()),
        (report.log_odds.rows(), report.log_odds.cols()),
        (report.column_percentages.rows(), report.column_percentages.cols()),
    ] {
        assert_eq!(r, rows);
        assert_eq!(c, cols);
    }
}

#[test]
fn test_expected_sum_matches_observed() {
    let mut records = scenario();
    repeat(&mut records, "arc", "B+", 3);
    repeat(&mut records, "loop", "AB-", 7);
    let report = analyze(&records, &AnalysisOptions::default()).unwrap();

    let expected: f64 = report.expected.values().iter().sum();
    assert!((expected - report.contingency.grand_total() as f64).abs() < 1e-9);
}

#[test]
fn test_full_three_by_eight_grid() {
    let mut records = Vec::new();
    for pattern in crate::constants::PATTERN_TYPES {
        for blood in crate::constants::BLOOD_TYPES {
            repeat(&mut records, pattern, blood, 2);
        }
    }

    let report = analyze(&records, &AnalysisOptions::default()).unwrap();

    assert_eq!(report.contingency.shape(), (3, 8));
    assert_eq!(report.chi_square.dof, 14);
    assert!(report.chi_square.chi2.abs() < 1e-12);
    assert!((report.chi_square.p - 1.0).abs() < 1e-12);
}

#[test]
fn test_empty_records_are_insufficient() {
    let err = analyze(&[], &AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, AnalyticsError::InsufficientData(_)));
}

#[test]
fn test_declared_empty_category_rejected_by_default() {
    let options = AnalysisOptions {
        declared_blood_groups: vec!["AB-".to_string()],
        ..AnalysisOptions::default()
    };

    let err = analyze(&scenario(), &options).unwrap_err();
    assert!(err.to_string().contains("AB-"));
}

#[test]
fn test_declared_empty_category_marked_undefined() {
    let options = AnalysisOptions {
        zero_margin_policy: ZeroMarginPolicy::MarkUndefined,
        declared_blood_groups: vec!["AB-".to_string()],
        ..AnalysisOptions::default()
    };

    let report = analyze(&scenario(), &options).unwrap();

    assert!(report.undefined_cells);
    assert_eq!(report.contingency.counts().cols(), &["A+", "AB-", "O-"]);
    assert_eq!(report.expected.get_by_label("arc", "AB-"), Some(&0.0));
    assert_eq!(report.residuals.get_by_label("arc", "AB-"), Some(&None));
    assert_eq!(report.column_percentages.get_by_label("loop", "AB-"), Some(&None));
    // zero-expected cells add nothing to chi2
    assert!((report.chi_square.chi2 - 20.0).abs() < 1e-9);
    assert_eq!(report.chi_square.dof, 4);
}

#[test]
fn test_yates_option_on_two_by_two() {
    let mut records = Vec::new();
    repeat(&mut records, "arc", "A+", 10);
    repeat(&mut records, "loop", "O-", 10);

    let plain = analyze(&records, &AnalysisOptions::default()).unwrap();
    let corrected = analyze(
        &records,
        &AnalysisOptions {
            yates_correction: true,
            ..AnalysisOptions::default()
        },
    )
    .unwrap();

    assert!((plain.chi_square.chi2 - 20.0).abs() < 1e-9);
    assert!((corrected.chi_square.chi2 - 16.2).abs() < 1e-9);
}

#[test]
fn test_pattern_distribution_order() {
    let report = analyze(&scenario(), &AnalysisOptions::default()).unwrap();
    let labels: Vec<(&str, u64)> = report
        .pattern_distribution
        .iter()
        .map(|c| (c.label.as_str(), c.count))
        .collect();

    // arc and loop tie at 10 → label order
    assert_eq!(labels, vec![("arc", 10), ("loop", 10), ("whorl", 10)]);
}

#[test]
fn test_probability_series_collected() {
    let mut with_probs = LabeledRecord::new("arc", "A+");
    with_probs.probabilities.insert("class1_arc".to_string(), 0.8);
    let mut other = LabeledRecord::new("loop", "O-");
    other.probabilities.insert("class1_arc".to_string(), 0.1);
    other.probabilities.insert("class3_loop".to_string(), 0.7);

    let report = analyze(&[with_probs, other], &AnalysisOptions::default()).unwrap();

    assert_eq!(report.probability_series.len(), 2);
    assert_eq!(report.probability_series[0].class, "class1_arc");
    assert_eq!(report.probability_series[0].values, vec![0.8, 0.1]);
    assert_eq!(report.probability_series[1].values, vec![0.7]);

    assert_eq!(report.correlation.shape(), (2, 2));
    assert_eq!(report.numeric_correlation.shape(), (4, 4));
    // a single record carries class3_loop
    assert_eq!(report.numeric_correlation.get_by_label("prob_class3_loop", "FingerprintType"), Some(&None));

    let none = analyze(&scenario(), &AnalysisOptions::default()).unwrap();
    assert!(none.probability_series.is_empty());
}

#[test]
fn test_report_serializes_undefined_as_null() {
    let report = analyze(&scenario(), &AnalysisOptions::default()).unwrap();
    let json = serde_json::to_value(&report.log_odds.to_column_major()).unwrap();

    assert!(json["O-"]["arc"].is_null());
    assert!(json["A+"]["arc"].is_number());
}
