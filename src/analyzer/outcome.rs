//! Outcome resolution.
//!
//! An outcome list is walked in order and the first outcome whose when-clause
//! matches decides the verdict. An outcome with an empty when-clause matches
//! unconditionally, so it normally sits at the end as the fallback.

use crate::analyzer::types::{AnalyzeResult, Outcome};
use crate::error::{Result, ResultExt};
use log::debug;

/// Resolve an outcome list against one entity.
///
/// `evaluate` is called with each non-empty when-clause until one returns
/// true. Evaluation errors abort the walk. If nothing matches the result is
/// inconclusive: it carries `title` and no verdict flag.
pub fn resolve<F>(outcomes: &[Outcome], title: &str, mut evaluate: F) -> Result<AnalyzeResult>
where
    F: FnMut(&str) -> Result<bool>,
{
    for (index, outcome) in outcomes.iter().enumerate() {
        let (kind, single) = outcome.variant(index)?;

        if single.is_unconditional() {
            debug!("{}: outcome #{} ({}) matched unconditionally", title, index, kind);
            return Ok(AnalyzeResult::from_outcome(title, kind, single));
        }

        let when = single.when.trim();
        let matched = evaluate(when).with_context(|| format!("failed to compare {:?}", when))?;
        if matched {
            debug!("{}: outcome #{} ({}) matched `{}`", title, index, kind, when);
            return Ok(AnalyzeResult::from_outcome(title, kind, single));
        }
    }

    debug!("{}: no outcome matched", title);
    Ok(AnalyzeResult::new(title))
}

/// Resolve an outcome list once per entity.
///
/// `title` names the result for each entity. Entities for which no outcome
/// matches produce no result. The first evaluation error aborts the whole
/// run, so callers never see a partial list.
pub fn resolve_each<'a, E, T, F>(
    outcomes: &[Outcome],
    entities: impl IntoIterator<Item = &'a E>,
    mut title: T,
    mut evaluate: F,
) -> Result<Vec<(&'a E, AnalyzeResult)>>
where
    E: ?Sized + 'a,
    T: FnMut(&E) -> String,
    F: FnMut(&str, &E) -> Result<bool>,
{
    let mut results = Vec::new();
    for entity in entities {
        let entity_title = title(entity);
        let result = resolve(outcomes, &entity_title, |when| evaluate(when, entity))
            .context("failed to evaluate outcomes")?;
        if !result.is_inconclusive() {
            results.push((entity, result));
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::OutcomeKind;
    use crate::error::{AnalyzeError, ErrorKind};

    fn equals(expected: &'static str) -> impl FnMut(&str) -> Result<bool> {
        move |when| Ok(when == expected)
    }

    #[test]
    fn test_first_match_wins() {
        let outcomes = vec![
            Outcome::fail("a", "fail a"),
            Outcome::warn("b", "warn b"),
            Outcome::pass("b", "pass b"),
        ];
        let result = resolve(&outcomes, "t", equals("b")).unwrap();
        assert_eq!(result.verdict(), Some(OutcomeKind::Warn));
        assert_eq!(result.message, "warn b");
        assert_eq!(result.title, "t");
    }

    #[test]
    fn test_order_sensitivity() {
        let outcomes = vec![Outcome::warn("x", "warned"), Outcome::pass("", "fallback")];

        let matched = resolve(&outcomes, "t", equals("x")).unwrap();
        assert_eq!(matched.verdict(), Some(OutcomeKind::Warn));

        let fallback = resolve(&outcomes, "t", equals("y")).unwrap();
        assert_eq!(fallback.verdict(), Some(OutcomeKind::Pass));
        assert_eq!(fallback.message, "fallback");
    }

    #[test]
    fn test_unconditional_outcome_stops_evaluation() {
        let outcomes = vec![Outcome::fail("", "always"), Outcome::pass("boom", "never reached")];
        let mut calls = 0;
        let result = resolve(&outcomes, "t", |_| {
            calls += 1;
            Err(AnalyzeError::malformed("boom", "should not be evaluated"))
        })
        .unwrap();
        assert!(result.is_fail);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_exhaustion_is_inconclusive() {
        let empty = resolve(&[], "nothing", equals("x")).unwrap();
        assert!(empty.is_inconclusive());
        assert_eq!(empty.title, "nothing");

        let outcomes = vec![Outcome::fail("a", "a"), Outcome::pass("b", "b")];
        let none = resolve(&outcomes, "t", equals("c")).unwrap();
        assert!(none.is_inconclusive());
        assert!(none.message.is_empty());
    }

    #[test]
    fn test_errors_abort_with_context() {
        let outcomes = vec![Outcome::fail("count ~ 2", "x"), Outcome::pass("", "fallback")];
        let err = resolve(&outcomes, "t", |when| Err(AnalyzeError::UnknownOperator(when.to_string()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOperator);
        assert!(err.to_string().starts_with("failed to compare \"count ~ 2\""));
    }

    #[test]
    fn test_empty_outcome_rejected_when_reached() {
        let outcomes = vec![Outcome::pass("x", "ok"), Outcome::default()];
        let err = resolve(&outcomes, "t", equals("y")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyOutcome);

        // an earlier match never reaches the bad entry
        assert!(resolve(&outcomes, "t", equals("x")).unwrap().is_pass);
    }

    #[test]
    fn test_resolve_each_drops_unmatched_entities() {
        let outcomes = vec![Outcome::fail("big", "too big"), Outcome::pass("small", "fine")];
        let sizes = ["big", "medium", "small"];
        let results = resolve_each(
            &outcomes,
            sizes.iter(),
            |s| format!("size {}", s),
            |when, s| Ok(when == *s),
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1.title, "size big");
        assert!(results[0].1.is_fail);
        assert_eq!(*results[1].0, "small");
        assert!(results[1].1.is_pass);
    }

    #[test]
    fn test_resolve_each_aborts_on_error() {
        let outcomes = vec![Outcome::fail("x", "x")];
        let entities = [1, 2, 3];
        let err = resolve_each(&outcomes, entities.iter(), |n| n.to_string(), |_, n| {
            if *n == 2 {
                Err(AnalyzeError::invalid_value("x", "bad"))
            } else {
                Ok(false)
            }
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(err.to_string().starts_with("failed to evaluate outcomes"));
    }
}
