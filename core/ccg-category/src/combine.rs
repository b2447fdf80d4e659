//! Target-driven combination: tries the rules in a fixed order and keeps
//! the first result whose category matches the requested one.

use log::{debug, trace};

use crate::category::Category;
use crate::context::IdContext;
use crate::error::CategoryError;
use crate::parse::CONJ_FEATURE;
use crate::rules;

/// Combines two adjacent categories into `target`.
///
/// Returns `Ok(None)` when no rule yields a category matching `target`.
/// Errors only come from type changes into an unparsable `target`.
pub fn combine(
    ctx: &mut IdContext,
    left: &Category,
    right: &Category,
    target: &str,
) -> Result<Option<Category>, CategoryError> {
    trace!("combine {} + {} => {}", left, right, target);
    let conj_target = target.ends_with(CONJ_FEATURE)
        || (left.cat_string() == "conj" && right.matches_str(target))
        || (right.cat_string() == "conj" && left.matches_str(target));

    let out = if conj_target {
        combine_conjunct(ctx, left, right, target)?
    } else if right.cat_string().ends_with(CONJ_FEATURE) {
        combine_coordination(ctx, left, right, target)?
    } else {
        combine_binary(ctx, left, right, target)?
    };

    match out {
        Some(cat) if !cat.matches_str(target) => {
            debug!("{} + {} gave {}, not {}", left, right, cat, target);
            Ok(None)
        }
        out => Ok(out),
    }
}

/// `conj X => X[conj]` (either order), falling back to a type change into
/// `target`.
fn combine_conjunct(
    ctx: &mut IdContext,
    left: &Category,
    right: &Category,
    target: &str,
) -> Result<Option<Category>, CategoryError> {
    if let Some(mut out) = rules::conjunction(right, left) {
        out.adjust_long_range_lnr();
        if !out.matches_str(target) {
            out = rules::type_changing_rule(ctx, right, target)?;
        }
        out.relabel(target);
        return Ok(Some(out));
    }
    match rules::conjunction(left, right) {
        Some(mut out) => {
            if !out.matches_str(target) {
                out = rules::type_changing_rule(ctx, left, target)?;
            }
            out.relabel(target);
            Ok(Some(out))
        }
        None => Ok(None),
    }
}

/// `X X[conj] => X`, or punctuation absorbing a conjunct. Only the
/// punctuation branch may type-change into `target`.
fn combine_coordination(
    ctx: &mut IdContext,
    left: &Category,
    right: &Category,
    target: &str,
) -> Result<Option<Category>, CategoryError> {
    if let Some(out) = rules::coordinate(left, right) {
        return Ok(Some(out));
    }
    let Some(mut out) = rules::punctuation(right, left) else {
        return Ok(None);
    };
    if !out.matches_str(target) {
        out = rules::type_changing_rule(ctx, left, target)?;
    }
    out.relabel(target);
    Ok(Some(out))
}

fn combine_binary(
    ctx: &mut IdContext,
    left: &Category,
    right: &Category,
    target: &str,
) -> Result<Option<Category>, CategoryError> {
    let applied = rules::forward_application(ctx, left, right)
        .or_else(|| rules::backward_application(ctx, left, right));
    if let Some(mut out) = applied {
        if out.matches_str(target) {
            out.relabel(target);
        }
        return Ok(Some(out));
    }

    if let Some(out) = rules::punctuation(left, right) {
        return retarget(ctx, out, left, target).map(Some);
    }
    if let Some(out) = rules::punctuation(right, left) {
        return retarget(ctx, out, right, target).map(Some);
    }

    // A composition that misses the target falls through to the next rule.
    if let Some(mut out) = rules::forward_composition(ctx, left, right) {
        if out.matches_str(target) {
            out.relabel(target);
            return Ok(Some(out));
        }
        trace!("forward composition gave {}, not {}", out, target);
    }
    if let Some(out) = rules::backward_composition(ctx, left, right) {
        if out.matches_str(target) {
            return Ok(Some(out));
        }
        trace!("backward composition gave {}, not {}", out, target);
    }

    let substituted =
        rules::substitute(ctx, right, left).or_else(|| rules::substitute(ctx, left, right));
    if substituted.is_some() {
        return Ok(substituted);
    }

    if left.cat_string() == target && right.cat_string() == target {
        return Ok(rules::coordinate(left, right));
    }
    Ok(None)
}

/// Type-changes `dtr` into `target` when punctuation left a different
/// category.
fn retarget(ctx: &mut IdContext, out: Category, dtr: &Category, target: &str) -> Result<Category, CategoryError> {
    if out.cat_string() == target {
        Ok(out)
    } else {
        rules::type_changing_rule(ctx, dtr, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::lex_cat_at;
    use ccg_protocol::TokenIndex;

    fn word(ctx: &mut IdContext, w: &str, cat: &str, index: u32) -> Category {
        lex_cat_at(ctx, w, cat, TokenIndex::new(index)).unwrap()
    }

    #[test]
    fn test_determiner_noun_phrase() {
        let mut ctx = IdContext::new();
        let the = word(&mut ctx, "the", "NP[nb]/N", 1);
        let dog = word(&mut ctx, "dog", "N", 2);

        let np = combine(&mut ctx, &the, &dog, "NP").unwrap().unwrap();
        assert_eq!(np.cat_string(), "NP");
        assert_eq!(np.head_word(), "dog");
        assert!(np.is_atomic());
    }

    #[test]
    fn test_result_is_relabelled_to_target() {
        let mut ctx = IdContext::new();
        let likes = word(&mut ctx, "likes", "(S[dcl]\\NP)/NP", 2);
        let mary = word(&mut ctx, "Mary", "NP", 3);

        let vp = combine(&mut ctx, &likes, &mary, "S\\NP").unwrap().unwrap();
        assert_eq!(vp.cat_string(), "S\\NP");
        assert_eq!(vp.filled_dependencies().len(), 1);
    }

    #[test]
    fn test_mismatched_target_gives_none() {
        let mut ctx = IdContext::new();
        let likes = word(&mut ctx, "likes", "(S[dcl]\\NP)/NP", 2);
        let mary = word(&mut ctx, "Mary", "NP", 3);

        assert!(combine(&mut ctx, &likes, &mary, "NP").unwrap().is_none());
        assert!(combine(&mut ctx, &mary, &mary, "S").unwrap().is_none());
    }

    #[test]
    fn test_punctuation_is_absorbed() {
        let mut ctx = IdContext::new();
        let s = word(&mut ctx, "rains", "S[dcl]", 1);
        let stop = word(&mut ctx, ".", ".", 2);

        let out = combine(&mut ctx, &s, &stop, "S[dcl]").unwrap().unwrap();
        assert_eq!(out.cat_string(), "S[dcl]");
        assert_eq!(out.head_word(), "rains");
    }

    #[test]
    fn test_coordination_in_two_steps() {
        let mut ctx = IdContext::new();
        let john = word(&mut ctx, "John", "NP", 1);
        let and = word(&mut ctx, "and", "conj", 2);
        let mary = word(&mut ctx, "Mary", "NP", 3);

        let conjunct = combine(&mut ctx, &and, &mary, "NP[conj]").unwrap().unwrap();
        assert_eq!(conjunct.cat_string(), "NP[conj]");

        let both = combine(&mut ctx, &john, &conjunct, "NP").unwrap().unwrap();
        assert_eq!(both.cat_string(), "NP");
        assert_eq!(both.heads().len(), 2);
    }

    #[test]
    fn test_composition_into_target() {
        let mut ctx = IdContext::new();
        let f = word(&mut ctx, "a", "X/Y", 1);
        let g = word(&mut ctx, "b", "Y/Z", 2);

        let out = combine(&mut ctx, &f, &g, "X/Z").unwrap().unwrap();
        assert_eq!(out.cat_string(), "X/Z");
        assert!(combine(&mut ctx, &f, &g, "X/W").unwrap().is_none());
    }

    #[test]
    fn test_bad_conjunct_target_is_an_error() {
        let mut ctx = IdContext::new();
        let and = word(&mut ctx, "and", "conj", 2);
        let mary = word(&mut ctx, "Mary", "NP", 3);

        assert!(combine(&mut ctx, &and, &mary, "(S[conj]").is_err());
    }

    #[test]
    fn test_composition_miss_falls_through_to_backward_composition() {
        let mut ctx = IdContext::new();
        let left = word(&mut ctx, "a", "A/B", 1);
        let right = word(&mut ctx, "b", "B\\A", 2);

        let forward = rules::forward_composition(&mut ctx, &left, &right).unwrap();
        assert_eq!(forward.cat_string(), "A\\A");

        let out = combine(&mut ctx, &left, &right, "B/B").unwrap().unwrap();
        assert_eq!(out.cat_string(), "B/B");
        assert_eq!(out.head_word(), "b");
    }

    #[test]
    fn test_compositions_miss_then_substitution() {
        let mut ctx = IdContext::new();
        let file = word(&mut ctx, "file", "(S\\NP)/NP", 1);
        let without = word(&mut ctx, "without", "((S\\NP)\\(S\\NP))/NP", 2);

        assert!(rules::forward_composition(&mut ctx, &file, &without).is_none());
        assert!(rules::backward_composition(&mut ctx, &file, &without).is_none());

        let out = combine(&mut ctx, &file, &without, "(S\\NP)/NP").unwrap().unwrap();
        assert_eq!(out.cat_string(), "(S\\NP)/NP");
        assert_eq!(out.slash(), Some(ccg_protocol::Slash::Forward));
    }

    #[test]
    fn test_same_string_fallback_coordinates() {
        let mut ctx = IdContext::new();
        let first = word(&mut ctx, "rains", "S[dcl]", 1);
        let second = word(&mut ctx, "pours", "S[dcl]", 2);

        let out = combine(&mut ctx, &first, &second, "S[dcl]").unwrap().unwrap();
        assert_eq!(out.cat_string(), "S[dcl]");
        assert_eq!(out.head_indices(), vec![TokenIndex::new(1), TokenIndex::new(2)]);
        assert!(combine(&mut ctx, &first, &second, "S").unwrap().is_none());
    }

    #[test]
    fn test_coordination_is_not_type_changed() {
        let mut ctx = IdContext::new();
        let john = word(&mut ctx, "John", "NP", 1);
        let and = word(&mut ctx, "and", "conj", 2);
        let mary = word(&mut ctx, "Mary", "NP", 3);

        let conjunct = combine(&mut ctx, &and, &mary, "NP[conj]").unwrap().unwrap();
        assert!(combine(&mut ctx, &john, &conjunct, "S").unwrap().is_none());
    }

    #[test]
    fn test_comma_before_conjunct_is_absorbed() {
        let mut ctx = IdContext::new();
        let comma = word(&mut ctx, ",", ",", 1);
        let and = word(&mut ctx, "and", "conj", 2);
        let mary = word(&mut ctx, "Mary", "NP", 3);

        let conjunct = combine(&mut ctx, &and, &mary, "NP[conj]").unwrap().unwrap();
        let out = combine(&mut ctx, &comma, &conjunct, "NP").unwrap().unwrap();
        assert_eq!(out.cat_string(), "NP");
        assert_eq!(out.head_word(), "Mary");
    }
}
