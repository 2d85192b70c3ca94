//! Property tests for matching, position accuracy and repair

use proptest::prelude::*;
use spanagree_core::{
    needs_repair, position_accuracy, repair, AccuracyMetrics, OverlapMatcher, ScoringConfig, Span,
};

fn span_strategy() -> impl Strategy<Value = Span> {
    (0usize..200, 1usize..40, prop::sample::select(vec!["bias", "Doubt", "Smears"])).prop_map(
        |(start, len, label)| Span::new(start, start + len, "x", vec![label.to_string()]).unwrap(),
    )
}

fn spans_strategy() -> impl Strategy<Value = Vec<Span>> {
    prop::collection::vec(span_strategy(), 0..12)
}

fn config_strategy() -> impl Strategy<Value = ScoringConfig> {
    (0.0f64..=1.0, any::<bool>()).prop_map(|(threshold, labels)| ScoringConfig {
        overlap_threshold: threshold,
        require_label_match: labels,
    })
}

proptest! {
    #[test]
    fn test_true_positives_bounded_by_smaller_side(
        reference in spans_strategy(),
        candidate in spans_strategy(),
        config in config_strategy(),
    ) {
        let result = OverlapMatcher::new(config).match_spans(&reference, &candidate);
        prop_assert!(result.true_positives <= reference.len().min(candidate.len()));
    }

    #[test]
    fn test_counts_are_conserved(
        reference in spans_strategy(),
        candidate in spans_strategy(),
        config in config_strategy(),
    ) {
        let result = OverlapMatcher::new(config).match_spans(&reference, &candidate);
        prop_assert_eq!(result.true_positives + result.false_negatives, reference.len());
        prop_assert_eq!(result.true_positives + result.false_positives, candidate.len());
        prop_assert_eq!(result.pairs.len(), result.true_positives);
    }

    #[test]
    fn test_matching_is_one_to_one(
        reference in spans_strategy(),
        candidate in spans_strategy(),
    ) {
        let result = OverlapMatcher::default().match_spans(&reference, &candidate);
        let mut seen_reference = vec![false; reference.len()];
        let mut seen_candidate = vec![false; candidate.len()];
        for pair in &result.pairs {
            prop_assert!(!seen_reference[pair.reference_index]);
            prop_assert!(!seen_candidate[pair.candidate_index]);
            seen_reference[pair.reference_index] = true;
            seen_candidate[pair.candidate_index] = true;
            prop_assert!(pair.overlap > 0);
        }
    }

    #[test]
    fn test_matching_is_deterministic(
        reference in spans_strategy(),
        candidate in spans_strategy(),
    ) {
        let matcher = OverlapMatcher::default();
        let first = matcher.match_spans(&reference, &candidate);
        let second = matcher.match_spans(&reference, &candidate);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_matches_need_an_overlapping_partner(
        reference in spans_strategy(),
        candidate in spans_strategy(),
        config in config_strategy(),
    ) {
        let lenient = OverlapMatcher::default().match_spans(&reference, &candidate);
        let strict = OverlapMatcher::new(config).match_spans(&reference, &candidate);
        // Every matched reference span has at least one overlapping candidate
        let with_partner = |r: &Span| candidate.iter().any(|c| r.overlaps(c));
        prop_assert!(strict.true_positives <= reference.iter().filter(|r| with_partner(r)).count());
        prop_assert!(lenient.true_positives <= reference.iter().filter(|r| with_partner(r)).count());
    }

    #[test]
    fn test_position_accuracy_bounds(
        reference in spans_strategy(),
        candidate in spans_strategy(),
    ) {
        let score = position_accuracy(&reference, &candidate);
        prop_assert!((0.0..=1.0).contains(&score));

        match (reference.is_empty(), candidate.is_empty()) {
            (true, true) => prop_assert_eq!(score, 1.0),
            (true, false) | (false, true) => prop_assert_eq!(score, 0.0),
            _ => {}
        }
    }

    #[test]
    fn test_position_accuracy_is_symmetric(
        reference in spans_strategy(),
        candidate in spans_strategy(),
    ) {
        prop_assert_eq!(
            position_accuracy(&reference, &candidate),
            position_accuracy(&candidate, &reference)
        );
    }

    #[test]
    fn test_metrics_bounded(
        tp in 0usize..1000,
        fp in 0usize..1000,
        fn_count in 0usize..1000,
    ) {
        let metrics = AccuracyMetrics::from_counts(tp, fp, fn_count);
        prop_assert!((0.0..=1.0).contains(&metrics.precision));
        prop_assert!((0.0..=1.0).contains(&metrics.recall));
        prop_assert!((0.0..=1.0).contains(&metrics.f1_score));
        prop_assert!(!metrics.f1_score.is_nan());
    }

    #[test]
    fn test_repair_of_correct_span_is_noop(
        prefix in "[a-zęėųš ]{0,20}",
        word in "[A-Za-zĄČĘĖĮŠŲŪŽąčęėįšųūž]{1,12}",
        suffix in "[a-zęėųš ]{0,20}",
    ) {
        let content = format!("{prefix}{word}{suffix}");
        // The word is the first place its text occurs
        prop_assume!(content.find(word.as_str()) == Some(prefix.len()));

        let start = prefix.chars().count();
        let end = start + word.chars().count();
        let span = Span::new(start, end, word.clone(), vec!["bias".to_string()]).unwrap();

        prop_assert!(!needs_repair(&span, &content));
        let repaired = repair(&span, &content).unwrap();
        prop_assert_eq!(repaired.span, span);
    }
}
