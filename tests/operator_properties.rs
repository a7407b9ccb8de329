use proptest::prelude::*;

use bundle_analyzer::analyzer::conditional::Evaluator;
use bundle_analyzer::analyzer::evaluators::{CpuEvaluator, CpuInfo, MemoryEvaluator, MemoryInfo};
use bundle_analyzer::analyzer::values::{Quantity, VersionRange, parse_duration};
use bundle_analyzer::analyzer::{ComparisonOperator, Outcome, OutcomeKind, resolve};
use bundle_analyzer::error::ErrorKind;

const OPERATOR_SPELLINGS: [&str; 9] = ["=", "==", "===", "!=", "!==", "<", "<=", ">", ">="];

fn cpu(count: i64) -> CpuInfo {
    CpuInfo {
        logical_count: count,
        physical_count: count,
        ..CpuInfo::default()
    }
}

proptest! {
    #[test]
    fn equality_aliases_agree(actual in -1000i64..1000, literal in -1000i64..1000) {
        let data = cpu(actual);
        let results: Vec<bool> = ["=", "==", "==="]
            .iter()
            .map(|op| CpuEvaluator.evaluate(&format!("count {} {}", op, literal), &data).unwrap())
            .collect();
        prop_assert!(results.iter().all(|r| *r == (actual == literal)));

        let ne: Vec<bool> = ["!=", "!=="]
            .iter()
            .map(|op| CpuEvaluator.evaluate(&format!("count {} {}", op, literal), &data).unwrap())
            .collect();
        prop_assert!(ne.iter().all(|r| *r == (actual != literal)));
    }

    #[test]
    fn ordering_operators_are_complementary(actual in 0i64..512, literal in 0i64..512) {
        let data = cpu(actual);
        let eval = |op: &str| CpuEvaluator.evaluate(&format!("count {} {}", op, literal), &data).unwrap();
        prop_assert_eq!(eval("<"), !eval(">="));
        prop_assert_eq!(eval(">"), !eval("<="));
        prop_assert_eq!(eval("=="), !eval("!="));
    }

    #[test]
    fn quantity_comparison_matches_bytes(total in 0u64..(1u64 << 40), gib in 0u64..1024) {
        let data = MemoryInfo { total };
        let matched = MemoryEvaluator.evaluate(&format!("total >= {}Gi", gib), &data).unwrap();
        prop_assert_eq!(matched, total >= gib << 30);
    }

    #[test]
    fn evaluation_is_idempotent(actual in 0i64..64, literal in 0i64..64, op_index in 0usize..6) {
        let op = ["==", "!=", "<", "<=", ">", ">="][op_index];
        let when = format!("count {} {}", op, literal);
        let data = cpu(actual);
        let first = CpuEvaluator.evaluate(&when, &data).unwrap();
        let second = CpuEvaluator.evaluate(&when, &data).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn first_matching_outcome_wins(actual in 0i64..16, threshold in 0i64..16) {
        let data = cpu(actual);
        let outcomes = vec![
            Outcome::fail(format!("count < {}", threshold), "below"),
            Outcome::pass("", "fallback"),
        ];
        let result = resolve(&outcomes, "cpu", |when| CpuEvaluator.evaluate(when, &data)).unwrap();
        let expected = if actual < threshold { OutcomeKind::Fail } else { OutcomeKind::Pass };
        prop_assert_eq!(result.verdict(), Some(expected));

        // moving the unconditional entry first shadows the conditional one
        let reversed: Vec<Outcome> = outcomes.into_iter().rev().collect();
        let result = resolve(&reversed, "cpu", |when| CpuEvaluator.evaluate(when, &data)).unwrap();
        prop_assert_eq!(result.verdict(), Some(OutcomeKind::Pass));
        prop_assert_eq!(result.message, "fallback");
    }

    #[test]
    fn unrecognized_operators_fail(
        token in any::<String>().prop_filter("recognized operator", |t| !OPERATOR_SPELLINGS.contains(&t.trim()))
    ) {
        let err = ComparisonOperator::parse(&token).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::UnknownOperator);
    }

    #[test]
    fn value_parsers_never_panic(s in "\\PC*") {
        let _ = Quantity::parse(&s);
        let _ = parse_duration(&s);
        let _ = VersionRange::parse(&s);
    }

    #[test]
    fn numeric_literals_parse_or_fail_cleanly(
        s in "[+-]?[0-9]{0,45}(\\.[0-9]{0,45})?([eE][+-]?[0-9]{1,11}|Ki|Mi|Gi|Ei|n|m|k|E|ns|ms|s|h)?"
    ) {
        let _ = Quantity::parse(&s);
        let _ = parse_duration(&s);
        let _ = VersionRange::parse(&s);
    }
}

#[test]
fn operator_spellings() {
    for (token, op) in [
        ("=", ComparisonOperator::Equal),
        ("===", ComparisonOperator::Equal),
        ("!==", ComparisonOperator::NotEqual),
        ("<=", ComparisonOperator::LessThanOrEqual),
    ] {
        assert_eq!(ComparisonOperator::parse(token).unwrap(), op);
    }
    assert!(ComparisonOperator::parse("=>").is_err());
}
