//! Coindexation rules for lexical categories whose slots realize a
//! displaced constituent: raising and control, relative pronouns,
//! pied-piping, extraction.
//!
//! The table is ordered and the first matching entry fires, once per
//! freshly built lexical category.

use ccg_protocol::Extraction;

use crate::category::{CatRef, Category, NodeIx, Step};

const A: Step = Step::Argument;
const R: Step = Step::Result;

const NP: &str = "NP";
const NOUN: &str = "N";
const S: &str = "S";
const VP: &str = "S\\NP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialCase {
    AuxiliaryModal,
    SubjectControlVerb,
    ObjectControlVerb,
    SubjectExtractionVerb,
    Verb,
    VpModifier,
    RelativePronoun,
    FreeRelativePronoun,
    GenitiveRelativePronoun,
    YesNoQuestion,
    NonStandardPiedPiping,
    PiedPipingAdjunctExtraction,
    StandardPiedPiping,
    PiedPipingRelativePronoun,
    PiedPipingSubjectRelativePronoun,
    PiedPipingEmbeddedQuestion,
    Determiner,
    Possessive,
    SmallClausePp,
    ToughAdjective,
}

/// Evaluation order of the rules.
pub const SPECIAL_CASES: [SpecialCase; 20] = [
    SpecialCase::AuxiliaryModal,
    SpecialCase::SubjectControlVerb,
    SpecialCase::ObjectControlVerb,
    SpecialCase::SubjectExtractionVerb,
    SpecialCase::Verb,
    SpecialCase::VpModifier,
    SpecialCase::RelativePronoun,
    SpecialCase::FreeRelativePronoun,
    SpecialCase::GenitiveRelativePronoun,
    SpecialCase::YesNoQuestion,
    SpecialCase::NonStandardPiedPiping,
    SpecialCase::PiedPipingAdjunctExtraction,
    SpecialCase::StandardPiedPiping,
    SpecialCase::PiedPipingRelativePronoun,
    SpecialCase::PiedPipingSubjectRelativePronoun,
    SpecialCase::PiedPipingEmbeddedQuestion,
    SpecialCase::Determiner,
    SpecialCase::Possessive,
    SpecialCase::SmallClausePp,
    SpecialCase::ToughAdjective,
];

/// First rule of the table that recognizes `cat`. Atomic categories never
/// match.
pub fn classify(cat: CatRef<'_>) -> Option<SpecialCase> {
    if cat.is_atomic() {
        return None;
    }
    SPECIAL_CASES.iter().copied().find(|case| case.matches(cat))
}

/// Runs the first matching rule on `cat` and reports which one fired.
pub(crate) fn apply_special_cases(cat: &mut Category) -> Option<SpecialCase> {
    let case = classify(cat.view())?;
    log::trace!("special case {:?} on {} ({})", case, cat.cat_string(), cat.head_word());
    case.rewrite(cat);
    Some(case)
}

impl SpecialCase {
    pub fn matches(self, cat: CatRef<'_>) -> bool {
        match self {
            SpecialCase::AuxiliaryModal => is_auxiliary_modal(cat),
            SpecialCase::SubjectControlVerb => {
                is_control_verb(cat) && cat.head_word().starts_with("promis")
            }
            SpecialCase::ObjectControlVerb => {
                is_control_verb(cat) && !cat.head_word().starts_with("promis")
            }
            SpecialCase::SubjectExtractionVerb => is_verb(cat) && is_subject_extraction(cat),
            SpecialCase::Verb => is_verb(cat),
            SpecialCase::VpModifier => is_vp_modifier(cat),
            SpecialCase::RelativePronoun => {
                relative_shape(cat, &["(NP\\NP)/(S\\NP)", "(NP\\NP)/(S/NP)"])
            }
            SpecialCase::FreeRelativePronoun => relative_shape(cat, &["NP/(S\\NP)", "NP/(S/NP)"]),
            SpecialCase::GenitiveRelativePronoun => is_genitive_relative_pronoun(cat),
            SpecialCase::YesNoQuestion => is_yes_no_question(cat),
            SpecialCase::NonStandardPiedPiping => {
                arg_matches(cat, &[A], "(NP\\NP)/NP")
                    && (arg_matches(cat, &[R, A], VP) || arg_matches(cat, &[R, A], "S//NP"))
                    && nominal_target(cat)
            }
            SpecialCase::PiedPipingAdjunctExtraction => {
                arg_matches(cat, &[A], "(NP\\NP)/NP") && arg_matches(cat, &[R, A], S) && nominal_target(cat)
            }
            SpecialCase::StandardPiedPiping => {
                arg_matches(cat, &[A], "NP/NP")
                    && (arg_matches(cat, &[R, A], VP) || arg_matches(cat, &[R, A], "S//NP"))
                    && nominal_target(cat)
            }
            SpecialCase::PiedPipingRelativePronoun => {
                arg_matches(cat, &[A], NOUN)
                    && arg_matches(cat, &[R, A], "(NP\\NP)/NP")
                    && arg_matches(cat, &[R, R, A], S)
                    && arg_matches(cat, &[R, R, R], "NP\\NP")
            }
            SpecialCase::PiedPipingSubjectRelativePronoun => {
                arg_matches(cat, &[A], NOUN)
                    && arg_matches(cat, &[R, A], "NP/NP")
                    && arg_matches(cat, &[R, R, A], VP)
                    && arg_matches(cat, &[R, R, R], "NP\\NP")
            }
            SpecialCase::PiedPipingEmbeddedQuestion => {
                cat.cat_string() == "((S[qem]/S[dcl])\\((NP\\NP)/NP))/N"
            }
            SpecialCase::Determiner => cat.cat_string() == "NP[nb]/N",
            SpecialCase::Possessive => cat.cat_string() == "(NP[nb]/N)\\NP",
            SpecialCase::SmallClausePp => is_small_clause_pp(cat),
            SpecialCase::ToughAdjective => cat.cat_string() == "(S[adj]\\NP)/((S[to]\\NP)/NP)",
        }
    }

    /// Applies the rule. Returns false when the category lacks a path the
    /// rule relinks; whatever was relinked before that point stays.
    pub(crate) fn rewrite(self, cat: &mut Category) -> bool {
        let applied = self.try_rewrite(cat).is_some();
        if !applied {
            log::trace!("special case {:?} skipped on {}", self, cat.cat_string());
        }
        applied
    }

    fn try_rewrite(self, cat: &mut Category) -> Option<()> {
        let root = cat.root();
        match self {
            SpecialCase::AuxiliaryModal => {
                let result = cat.path(root, &[R])?;
                let subject = cat.path(root, &[R, A])?;
                let result_cat = cat.at(result).cat_string();
                if result_cat != "S[dcl]\\NP" {
                    let drops_subject = result_cat == "S[to]\\NP"
                        || matches!(cat.head_word(), "be" | "been" | "have" | "going");
                    if drops_subject {
                        cat.node_mut(subject).deps.clear();
                    }
                }
                let complement = cat.path(root, &[A])?;
                relink_argument(cat, complement, subject, Extraction::bounded());
            }
            SpecialCase::SubjectControlVerb => {
                let controlled = cat.path(root, &[R, A, A])?;
                let subject = cat.path(root, &[R, R, A])?;
                share_head(cat, controlled, subject);
                cat.node_mut(controlled).mark_extracted(true);
            }
            SpecialCase::ObjectControlVerb | SpecialCase::YesNoQuestion => {
                let complement = cat.path(root, &[R, A])?;
                let object = cat.path(root, &[A])?;
                relink_argument(cat, complement, object, Extraction::bounded());
            }
            SpecialCase::SubjectExtractionVerb => {
                let complement = cat.path(root, &[A])?;
                let object = cat.path(root, &[R, A])?;
                relink_argument(cat, complement, object, Extraction::unbounded());
                if is_tough_verb(cat.view()) {
                    relink_tough_verb(cat);
                }
            }
            SpecialCase::Verb => {
                if !relink_other_object_control(cat) {
                    relink_complement_vps(cat);
                }
                if is_tough_verb(cat.view()) {
                    relink_tough_verb(cat);
                }
            }
            SpecialCase::VpModifier => {
                relink_vp_modifier(cat);
                if is_small_clause_pp(cat.view()) {
                    SpecialCase::SmallClausePp.try_rewrite(cat)?;
                }
            }
            SpecialCase::RelativePronoun => {
                let clause = cat.path(root, &[A])?;
                let modified = cat.path(root, &[R, A])?;
                let mark = extraction_by_direction(cat.at(clause))?;
                relink_argument(cat, clause, modified, mark);
            }
            SpecialCase::FreeRelativePronoun => {
                let clause = cat.path(root, &[A])?;
                let result = cat.path(root, &[R])?;
                let mark = extraction_by_direction(cat.at(clause))?;
                relink_argument(cat, clause, result, mark);
            }
            SpecialCase::GenitiveRelativePronoun => {
                let clause = cat.path(root, &[R, A])?;
                let noun = cat.path(root, &[A])?;
                let mark = extraction_by_direction(cat.at(clause))?;
                relink_argument(cat, clause, noun, mark);
            }
            SpecialCase::NonStandardPiedPiping => {
                let filler = filler_of_target(cat)?;
                let head = cat.node(filler).head_id;
                let preposition_object = cat.path(root, &[A, A])?;
                cat.node_mut(preposition_object).head_id = head;
                cat.node_mut(preposition_object).mark_extracted(true);

                let clause = cat.path(root, &[R, A])?;
                if cat.at(clause).cat_string() != "S[to]\\NP" {
                    let gap = cat.path(root, &[R, A, A])?;
                    let bounded = cat.at(clause).is_backward();
                    cat.node_mut(gap).head_id = head;
                    cat.node_mut(gap).mark_extracted(bounded);
                }
            }
            SpecialCase::PiedPipingAdjunctExtraction => {
                let filler = filler_of_target(cat)?;
                let preposition_object = cat.path(root, &[A, A])?;
                share_head(cat, preposition_object, filler);
                cat.node_mut(preposition_object).mark_extracted(true);
            }
            SpecialCase::StandardPiedPiping => {
                let modifier = cat.path(root, &[A])?;
                let gap = cat.path(root, &[R, A, A])?;
                share_head(cat, modifier, gap);
                cat.node_mut(gap).mark_extracted(true);

                let filler = filler_of_target(cat)?;
                let preposition_object = cat.path(root, &[A, A])?;
                share_head(cat, preposition_object, filler);
                cat.node_mut(preposition_object).mark_extracted(true);
            }
            SpecialCase::PiedPipingRelativePronoun | SpecialCase::PiedPipingEmbeddedQuestion => {
                let preposition_object = cat.path(root, &[R, A, A])?;
                let noun = cat.path(root, &[A])?;
                share_head(cat, preposition_object, noun);
                cat.node_mut(preposition_object).mark_extracted(true);
            }
            SpecialCase::PiedPipingSubjectRelativePronoun => {
                let noun = cat.path(root, &[A])?;
                let possessor = cat.path(root, &[R, A, A])?;
                share_head(cat, noun, possessor);
                cat.node_mut(possessor).mark_extracted(true);

                let clause = cat.path(root, &[R, R, A])?;
                if cat.at(clause).matches_str(VP) {
                    let subject = cat.path(root, &[R, R, A, A])?;
                    let phrase = cat.path(root, &[R, A, R])?;
                    share_head(cat, subject, phrase);
                    cat.node_mut(subject).mark_extracted(true);
                }
            }
            SpecialCase::Determiner => {
                let result = cat.path(root, &[R])?;
                let noun = cat.path(root, &[A])?;
                share_head(cat, result, noun);
                cat.node_mut(result).heads.clear();
            }
            SpecialCase::Possessive => {
                let phrase = cat.path(root, &[R, R])?;
                let noun = cat.path(root, &[R, A])?;
                share_head(cat, phrase, noun);
                cat.node_mut(phrase).heads.clear();
            }
            SpecialCase::SmallClausePp => {
                let object = cat.path(root, &[A])?;
                let subject = cat.path(root, &[R, A, A])?;
                share_head(cat, object, subject);
                cat.node_mut(subject).mark_extracted(true);
            }
            SpecialCase::ToughAdjective => {
                let complement = cat.path(root, &[A])?;
                let subject = cat.path(root, &[R, A])?;
                relink_argument(cat, complement, subject, Extraction::unbounded());
            }
        }
        Some(())
    }
}

/// Replaces the argument of `owner` with a copy of `source`, marked as
/// extracted.
fn relink_argument(cat: &mut Category, owner: NodeIx, source: NodeIx, mark: Extraction) {
    if cat.arg_ix(owner).is_none() {
        return;
    }
    let copy = cat.copy_within(source, owner);
    cat.node_mut(copy).extraction = mark;
    cat.set_argument(owner, copy);
}

fn share_head(cat: &mut Category, target: NodeIx, source: NodeIx) {
    let head = cat.node(source).head_id;
    cat.node_mut(target).head_id = head;
}

fn extraction_by_direction(cat: CatRef<'_>) -> Option<Extraction> {
    match cat.slash()? {
        ccg_protocol::Slash::Backward => Some(Extraction::bounded()),
        ccg_protocol::Slash::Forward => Some(Extraction::unbounded()),
    }
}

/// The argument next to the innermost result.
fn filler_of_target(cat: &Category) -> Option<NodeIx> {
    let target = cat.target_ix(cat.root());
    let parent = cat.parent_ix(target)?;
    cat.arg_ix(parent)
}

fn arg_matches(cat: CatRef<'_>, steps: &[Step], shape: &str) -> bool {
    cat.at(steps).map_or(false, |node| node.matches_str(shape))
}

fn is_expletive(cat: &str) -> bool {
    cat == "NP[expl]" || cat == "NP[thr]"
}

fn nominal_target(cat: CatRef<'_>) -> bool {
    let target = cat.target();
    target.matches_str(NP) || target.matches_str(NOUN)
}

fn is_auxiliary_modal(cat: CatRef<'_>) -> bool {
    let s = cat.cat_string();
    s != "(S\\NP)/(S\\NP)"
        && s != "(S[adj]\\NP)/(S[adj]\\NP)"
        && cat.matches_str("(S\\NP)/(S\\NP)")
        && cat.result().map_or(false, |r| r.cat_string() != "S[adj]\\NP")
        && cat.at(&[R, A]).map_or(false, |np| !is_expletive(np.cat_string()))
}

fn is_control_verb(cat: CatRef<'_>) -> bool {
    let s = cat.cat_string();
    s != "((S\\NP)/(S\\NP))/NP"
        && s != "((S[adj]\\NP)/(S[adj]\\NP))/NP"
        && !s.starts_with("((S[pss]\\NP)")
        && cat.matches_str("((S\\NP)/(S\\NP))/NP")
        && !s.contains("[expl]")
        && !s.contains("[thr]")
}

/// A category projecting a featured sentence that takes a non-expletive
/// subject on its left.
fn is_verb(cat: CatRef<'_>) -> bool {
    let target = cat.target();
    let projects_sentence = target.matches_str(S)
        && target.cat_string() != S
        && target.cat_string() != "S[adj]";
    projects_sentence
        && target.parent().map_or(false, |function| {
            function.is_backward()
                && function
                    .argument()
                    .map_or(false, |np| np.matches_str(NP) && !is_expletive(np.cat_string()))
        })
}

fn is_subject_extraction(cat: CatRef<'_>) -> bool {
    cat.matches_str("((S\\NP)/NP)/(S\\NP)")
        && cat.argument().map_or(false, |a| a.cat_string() == "S[dcl]\\NP")
}

fn is_tough_verb(cat: CatRef<'_>) -> bool {
    let is = |steps: &[Step], s: &str| cat.at(steps).map_or(false, |n| n.cat_string() == s);
    is(&[A], NP) && is(&[R, A], "(S[to]\\NP)/NP") && is(&[R, R, A], NP)
}

fn relink_tough_verb(cat: &mut Category) -> Option<()> {
    let root = cat.root();
    let complement = cat.path(root, &[R, A])?;
    let object = cat.path(root, &[R, R, A])?;
    relink_argument(cat, complement, object, Extraction::unbounded());
    Some(())
}

/// Coindexes the subject of a VP complement with the outermost NP
/// complement. Returns whether both were found.
fn relink_other_object_control(cat: &mut Category) -> bool {
    let target = cat.target_ix(cat.root());
    let mut cursor = cat.parent_ix(target).and_then(|p| cat.parent_ix(p));
    let mut complement_vp = None;
    let mut complement_np = None;
    while let Some(ix) = cursor {
        let Some(argument) = cat.arg_ix(ix) else {
            break;
        };
        let view = cat.at(argument);
        if view.matches_str(VP) {
            complement_vp = Some(argument);
        }
        if view.matches_str(NP) && !is_expletive(view.cat_string()) {
            complement_np = Some(argument);
        }
        cursor = cat.parent_ix(ix);
    }
    match (complement_vp, complement_np) {
        (Some(vp), Some(np)) => {
            relink_argument(cat, vp, np, Extraction::bounded());
            true
        }
        _ => false,
    }
}

/// Coindexes the subject of every VP complement with the verb's subject.
fn relink_complement_vps(cat: &mut Category) -> Option<()> {
    if cat.cat_string().contains("[expl]") {
        return None;
    }
    let target = cat.target_ix(cat.root());
    let function = cat.parent_ix(target)?;
    let subject = cat.arg_ix(function)?;
    let mut cursor = cat.parent_ix(function);
    while let Some(ix) = cursor {
        if let Some(argument) = cat.arg_ix(ix) {
            if cat.at(argument).matches_str(VP) {
                relink_argument(cat, argument, subject, Extraction::bounded());
            }
        }
        cursor = cat.parent_ix(ix);
    }
    Some(())
}

fn is_vp_modifier(cat: CatRef<'_>) -> bool {
    let mut cursor = Some(cat);
    while let Some(node) = cursor {
        if let (Some(argument), Some(result)) = (node.argument(), node.result()) {
            if argument.cat_string() == VP && result.cat_string() == VP {
                return true;
            }
        }
        cursor = node.result();
    }
    false
}

/// The VP argument of a VP modifier takes the modified VP's subject.
fn relink_vp_modifier(cat: &mut Category) -> Option<()> {
    let root = cat.root();
    let complement = cat.path(root, &[A])?;
    let view = cat.at(complement);
    if !view.matches_str(VP) || view.cat_string() == "S[asup]\\NP" || view.cat_string() == VP {
        return None;
    }
    let result = cat.path(root, &[R])?;
    let result_cat = cat.at(result).cat_string();
    let subject = if is_vp_adjunct(result_cat) {
        cat.path(root, &[R, A, A])?
    } else {
        let inner = cat.at(result).argument()?;
        let inner_result = cat.at(result).result()?;
        if inner.cat_string() != inner_result.cat_string() || !is_vp_adjunct(inner.cat_string()) {
            return None;
        }
        cat.path(root, &[R, A, A, A])?
    };
    relink_argument(cat, complement, subject, Extraction::bounded());
    Some(())
}

fn is_vp_adjunct(cat: &str) -> bool {
    cat == "(S\\NP)\\(S\\NP)" || cat == "(S\\NP)/(S\\NP)"
}

fn relative_shape(cat: CatRef<'_>, shapes: &[&str]) -> bool {
    let bare = crate::parse::no_features(cat.cat_string());
    shapes.contains(&bare.as_str())
        && cat.argument().map_or(false, |a| {
            !matches!(a.cat_string(), "S[adj]\\NP" | "S[asup]\\NP" | "S[ng]\\NP")
        })
}

fn is_genitive_relative_pronoun(cat: CatRef<'_>) -> bool {
    let (Some(argument), Some(clause), Some(result)) = (cat.argument(), cat.at(&[R, A]), cat.at(&[R, R])) else {
        return false;
    };
    clause.argument().is_some()
        && argument.cat_string() == NOUN
        && (clause.matches_str("S/NP") || clause.matches_str(VP))
        && !matches!(clause.cat_string(), "S[adj]\\NP" | "S[asup]\\NP")
        && clause.id() != result.id()
}

fn is_yes_no_question(cat: CatRef<'_>) -> bool {
    let (Some(argument), Some(clause), Some(result)) = (cat.argument(), cat.at(&[R, A]), cat.at(&[R, R])) else {
        return false;
    };
    clause.argument().is_some()
        && argument.matches_str(NP)
        && argument.cat_string() != "NP[expl]"
        && clause.matches_str(VP)
        && result.cat_string() == "S[q]"
}

fn is_small_clause_pp(cat: CatRef<'_>) -> bool {
    let (Some(argument), Some(result)) = (cat.argument(), cat.result()) else {
        return false;
    };
    let (Some(complement), Some(inner)) = (result.argument(), result.result()) else {
        return false;
    };
    let inner_is_adjunct = match (inner.argument(), inner.result()) {
        (Some(a), Some(r)) => a.id() == r.id(),
        _ => false,
    };
    let s = cat.cat_string();
    cat.is_forward()
        && argument.matches_str(NP)
        && argument.cat_string() != NOUN
        && result.is_forward()
        && complement.matches_str(VP)
        && (inner_is_adjunct
            || inner.matches_str("PP")
            || inner.cat_string() == "S[for]"
            || inner.matches_str("(S\\NP)\\(S\\NP)")
            || inner.matches_str("NP\\NP")
            || inner.matches_str("S\\S")
            || inner.matches_str("S/S"))
        && !s.contains("[thr]")
        && !s.contains("[expl")
}
