//! Lexical categories: a parsed category plus its word, head groups,
//! argument templates and special-case coindexation.

use ccg_protocol::{HeadId, HeadWord, TokenIndex};

use crate::category::{Category, NodeIx};
use crate::context::IdContext;
use crate::deps::{Dependency, DependencyList};
use crate::error::CategoryError;
use crate::heads::HeadWordList;
use crate::parse::{self, CONJ_FEATURE};
use crate::rules;
use crate::special;

/// Token index given to heads built without an explicit position.
pub const DEFAULT_TOKEN_INDEX: TokenIndex = TokenIndex::new(1);

/// Parses a category string into a tree with fresh ids for every node.
pub fn parse_cat(ctx: &mut IdContext, category: &str) -> Result<Category, CategoryError> {
    Category::parse(ctx, category)
}

pub fn lex_cat(ctx: &mut IdContext, word: &str, category: &str) -> Result<Category, CategoryError> {
    lex_cat_at(ctx, word, category, DEFAULT_TOKEN_INDEX)
}

/// Lexical category for `word` at position `index`.
///
/// Adjuncts pass their argument through as their result, the target gets
/// the head word, every argument on the way back to the root gets a
/// template numbered from 1, and the special-case table runs last.
pub fn lex_cat_at(
    ctx: &mut IdContext,
    word: &str,
    category: &str,
    index: TokenIndex,
) -> Result<Category, CategoryError> {
    let mut cat = Category::parse(ctx, category)?;
    let root = cat.root();
    cat.normalize_adjuncts(ctx, root);

    let heads = HeadWordList::single(HeadWord::new(word, category, index));
    let head_id = ctx.fresh_head_id();
    let node = cat.root_mut();
    node.heads = heads.clone();
    node.head_id = head_id;

    let target = cat.target_ix(root);
    cat.assign_heads_deps(ctx, target, 1, &heads, head_id);
    special::apply_special_cases(&mut cat);
    Ok(cat)
}

/// Lexical category with an empty word. A `[conj]` string becomes the
/// conjunct-shaped category, keeping the `[conj]` rendering.
pub fn ccg_cat_from_string(ctx: &mut IdContext, category: &str) -> Result<Category, CategoryError> {
    let mut cat = lex_cat(ctx, "", category)?;
    if category.ends_with(CONJ_FEATURE) {
        cat.adjust_long_range_lnr();
        cat = rules::type_changing_rule(ctx, &cat, category)?;
        cat.relabel(category);
    }
    Ok(cat)
}

impl Category {
    /// Every adjunct below `ix` (arguments first) gets its result rebuilt from
    /// its argument, minus the argument's templates.
    fn normalize_adjuncts(&mut self, ctx: &mut IdContext, ix: NodeIx) {
        let Some(f) = self.functor(ix) else {
            return;
        };
        self.normalize_adjuncts(ctx, f.argument);
        if self.at(ix).is_adjunct_cat() {
            let head = ctx.fresh_head_id();
            self.set_head_id_chain(f.argument, head);
            let result = self.copy_within(f.argument, ix);
            self.node_mut(result).deps.clear();
            self.set_result(ix, result);
        }
    }

    /// Walks from `ix` up to the root, giving each node `head_id` (and
    /// `heads` where it has none) and each argument a fresh head group plus a
    /// template for slot `slot`, `slot + 1`, and so on.
    pub(crate) fn assign_heads_deps(
        &mut self,
        ctx: &mut IdContext,
        ix: NodeIx,
        slot: u32,
        heads: &HeadWordList,
        head_id: HeadId,
    ) {
        let mut slot = slot;
        let mut cursor = Some(ix);
        while let Some(current) = cursor {
            let node = self.node_mut(current);
            node.head_id = head_id;
            if node.heads.is_empty() {
                node.heads = heads.clone();
            }

            if let Some(f) = self.functor(current) {
                let argument_head = ctx.fresh_head_id();
                self.set_head_id_chain(f.argument, argument_head);
                if let Some(head) = self.node(current).heads.first() {
                    let template = Dependency::template(Some(head), slot, f.slash);
                    self.node_mut(f.argument).deps = DependencyList::from(vec![template]);
                    slot += 1;
                }
                if self.at(current).is_adjunct_cat() {
                    let adjunct_head = ctx.fresh_head_id();
                    self.set_head_id_chain(f.argument, adjunct_head);
                    let result = self.copy_within(f.argument, current);
                    self.set_result(current, result);
                }
            }
            cursor = self.parent_ix(current);
        }
    }

    /// A lexical category for a revealed `word` whose templates and result
    /// point at this category's head.
    pub fn for_reveal(
        &self,
        ctx: &mut IdContext,
        word: &str,
        category: &str,
        index: TokenIndex,
    ) -> Result<Category, CategoryError> {
        let mut revealed = lex_cat_at(ctx, word, category, index)?;
        let root = revealed.root();
        let heads = self.heads().clone();
        if let Some(argument) = revealed.arg_ix(root) {
            if let Some(head_category) = heads.first().map(|h| h.category.clone()) {
                let mut deps = revealed.node(argument).deps.clone();
                deps.set_head_category(&head_category);
                revealed.node_mut(argument).deps = deps;
            }
        }
        if let Some(result) = revealed.res_ix(root) {
            revealed.node_mut(result).heads = heads.clone();
        }
        revealed.root_mut().heads = heads;
        Ok(revealed)
    }
}

/// Type-changes `cat` into `category` and gives the result the new root's
/// heads.
pub fn reveal(ctx: &mut IdContext, cat: &Category, category: &str) -> Result<Category, CategoryError> {
    let mut revealed = rules::type_changing_rule(ctx, cat, category)?;
    let root = revealed.root();
    if let Some(result) = revealed.res_ix(root) {
        let heads = revealed.node(root).heads.clone();
        revealed.node_mut(result).heads = heads;
    }
    Ok(revealed)
}

/// Copy of `cat` in which every `(S\NP)\(S\NP)` node is rebuilt as `S\S`
/// over its inner sentences, rendered from its leaves.
pub fn change_vp_cat(cat: &Category) -> Category {
    let mut out = Category::from_root(cat.node(cat.root()).clone());
    let root = out.root();
    out.node_mut(root).functor = None;
    flatten_vp_adjuncts(cat, cat.root(), &mut out, root);
    let rendered = out.cat_string_rec();
    out.relabel(&rendered);
    out
}

/// Fills `dst` (a childless copy of `src`) with flattened copies of `src`'s
/// children.
fn flatten_vp_adjuncts(cat: &Category, src: NodeIx, out: &mut Category, dst: NodeIx) {
    let Some(f) = cat.functor(src) else {
        return;
    };
    let (result_src, argument_src) = if parse::no_features(&cat.node(src).cat) == "(S\\NP)\\(S\\NP)" {
        match (cat.res_ix(f.result), cat.res_ix(f.argument)) {
            (Some(inner_result), Some(inner_argument)) => {
                let rendered = format!(
                    "{}\\{}",
                    cat.node(inner_result).cat,
                    cat.node(inner_argument).cat
                );
                out.node_mut(dst).cat = rendered;
                (inner_result, inner_argument)
            }
            _ => (f.result, f.argument),
        }
    } else {
        (f.result, f.argument)
    };

    let mut result_node = cat.node(result_src).clone();
    result_node.functor = None;
    result_node.parent = Some(dst);
    let result = out.push(result_node);

    let mut argument_node = cat.node(argument_src).clone();
    argument_node.functor = None;
    argument_node.parent = Some(dst);
    if argument_src != f.argument {
        argument_node.deps = cat.node(f.argument).deps.clone();
    }
    let argument = out.push(argument_node);

    out.node_mut(dst).functor = Some(crate::category::Functor {
        slash: f.slash,
        result,
        argument,
    });
    flatten_vp_adjuncts(cat, result_src, out, result);
    flatten_vp_adjuncts(cat, argument_src, out, argument);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Step;
    use crate::special::SpecialCase;
    use ccg_protocol::{Extraction, Slash};

    #[test]
    fn test_transitive_verb_templates() {
        let mut ctx = IdContext::new();
        let likes = lex_cat_at(&mut ctx, "likes", "(S[dcl]\\NP)/NP", TokenIndex::new(1)).unwrap();

        assert_eq!(likes.head_word(), "likes");
        assert_eq!(likes.target().heads().word(), "likes");

        let subject = likes.view().at(&[Step::Result, Step::Argument]).unwrap();
        let subject_dep = subject.deps().iter().next().unwrap();
        assert_eq!(subject_dep.slot, 1);
        assert_eq!(subject_dep.direction, Slash::Backward);
        assert_eq!(subject_dep.head.as_ref().unwrap().word, "likes");

        let object = likes.argument().unwrap();
        let object_dep = object.deps().iter().next().unwrap();
        assert_eq!(object_dep.slot, 2);
        assert_eq!(object_dep.direction, Slash::Forward);

        // The whole spine projects one head group; arguments get their own.
        assert_eq!(likes.result().unwrap().head_id(), likes.head_id());
        assert_ne!(object.head_id(), likes.head_id());
        assert_ne!(subject.head_id(), object.head_id());
    }

    #[test]
    fn test_adjunct_result_is_argument_copy() {
        let mut ctx = IdContext::new();
        let adj = lex_cat(&mut ctx, "big", "N/N").unwrap();

        let argument = adj.argument().unwrap();
        let result = adj.result().unwrap();
        assert_eq!(argument.id(), result.id());
        assert_eq!(argument.head_id(), result.head_id());
        assert_eq!(adj.cat_string(), "N/N");
        assert_eq!(adj.head_word(), "big");
        assert!(result.heads().is_empty());
        assert_eq!(result.deps().len(), 1);
    }

    #[test]
    fn test_determiner_passes_noun_head() {
        let mut ctx = IdContext::new();
        let the = lex_cat(&mut ctx, "the", "NP[nb]/N").unwrap();

        assert_eq!(special::classify(the.view()), Some(SpecialCase::Determiner));
        let result = the.result().unwrap();
        assert!(result.heads().is_empty());
        assert_eq!(result.head_id(), the.argument().unwrap().head_id());
    }

    #[test]
    fn test_relative_pronoun_marks_gap() {
        let mut ctx = IdContext::new();
        let who = lex_cat(&mut ctx, "who", "(NP\\NP)/(S[dcl]\\NP)").unwrap();

        assert_eq!(special::classify(who.view()), Some(SpecialCase::RelativePronoun));
        let gap = who.view().at(&[Step::Argument, Step::Argument]).unwrap();
        assert_eq!(gap.extraction(), Extraction::bounded());
        assert_eq!(gap.head_id(), who.view().at(&[Step::Result, Step::Argument]).unwrap().head_id());
        assert_eq!(who.cat_string_indexed(), "(NP_11\\NP_11)/(S[dcl]_12\\NP_11:B)_12");
    }

    #[test]
    fn test_object_relative_pronoun_is_unbounded() {
        let mut ctx = IdContext::new();
        let that = lex_cat(&mut ctx, "that", "(NP\\NP)/(S[dcl]/NP)").unwrap();

        let gap = that.view().at(&[Step::Argument, Step::Argument]).unwrap();
        assert!(gap.extraction().is_extracted());
        assert!(!gap.extraction().is_bounded());
    }

    #[test]
    fn test_object_control_links_object() {
        let mut ctx = IdContext::new();
        let persuade = lex_cat(&mut ctx, "persuaded", "((S[dcl]\\NP)/(S[to]\\NP))/NP").unwrap();

        assert_eq!(special::classify(persuade.view()), Some(SpecialCase::ObjectControlVerb));
        let controlled = persuade
            .view()
            .at(&[Step::Result, Step::Argument, Step::Argument])
            .unwrap();
        assert_eq!(controlled.head_id(), persuade.argument().unwrap().head_id());
        assert_eq!(controlled.extraction(), Extraction::bounded());
    }

    #[test]
    fn test_subject_control_links_subject() {
        let mut ctx = IdContext::new();
        let promised = lex_cat(&mut ctx, "promised", "((S[dcl]\\NP)/(S[to]\\NP))/NP").unwrap();

        assert_eq!(special::classify(promised.view()), Some(SpecialCase::SubjectControlVerb));
        let view = promised.view();
        let controlled = view.at(&[Step::Result, Step::Argument, Step::Argument]).unwrap();
        let subject = view.at(&[Step::Result, Step::Result, Step::Argument]).unwrap();
        assert_eq!(controlled.head_id(), subject.head_id());
    }

    #[test]
    fn test_auxiliary_to_drops_subject_dependency() {
        let mut ctx = IdContext::new();
        let to = lex_cat(&mut ctx, "to", "(S[to]\\NP)/(S[b]\\NP)").unwrap();

        assert_eq!(special::classify(to.view()), Some(SpecialCase::AuxiliaryModal));
        let view = to.view();
        assert!(view.at(&[Step::Result, Step::Argument]).unwrap().deps().is_empty());
        let raised = view.at(&[Step::Argument, Step::Argument]).unwrap();
        assert!(raised.deps().is_empty());
        assert_eq!(raised.extraction(), Extraction::bounded());
    }

    #[test]
    fn test_modal_keeps_subject_dependency() {
        let mut ctx = IdContext::new();
        let will = lex_cat(&mut ctx, "will", "(S[dcl]\\NP)/(S[b]\\NP)").unwrap();

        let view = will.view();
        assert_eq!(view.at(&[Step::Result, Step::Argument]).unwrap().deps().len(), 1);
        let raised = view.at(&[Step::Argument, Step::Argument]).unwrap();
        assert_eq!(raised.deps().len(), 1);
        assert_eq!(raised.deps().iter().next().unwrap().slot, 1);
    }

    #[test]
    fn test_atomic_categories_are_plain() {
        let mut ctx = IdContext::new();
        let mary = lex_cat_at(&mut ctx, "Mary", "NP", TokenIndex::new(2)).unwrap();

        assert_eq!(special::classify(mary.view()), None);
        assert_eq!(mary.head_indices(), vec![TokenIndex::new(2)]);
        assert_eq!(mary.cat_string_indexed(), "NP");
        assert_eq!(mary.cat_string_rec_indexed(), format!("NP:{}", mary.head_id()));
    }

    #[test]
    fn test_indexed_cat_with_deps() {
        let mut ctx = IdContext::new();
        let sleeps = lex_cat(&mut ctx, "sleeps", "S[dcl]\\NP").unwrap();
        let subject_head = sleeps.argument().unwrap().head_id();

        assert_eq!(sleeps.indexed_cat(), format!("(S[dcl]{{_}}\\NP{{X{subject_head}}}){{_}}"));
        assert_eq!(
            sleeps.indexed_cat_with_deps(),
            format!("(S[dcl]{{_}}\\NP{{X{subject_head}}}){{_}};;_ 1 X{subject_head}")
        );
    }

    #[test]
    fn test_conj_string_category() {
        let mut ctx = IdContext::new();
        let conj = ccg_cat_from_string(&mut ctx, "S[dcl]\\NP[conj]").unwrap();

        assert_eq!(conj.cat_string(), "S[dcl]\\NP[conj]");
        assert_eq!(conj.argument().unwrap().cat_string(), "NP");
        assert_eq!(conj.head_word(), "");
        let plain = ccg_cat_from_string(&mut ctx, "NP").unwrap();
        assert_eq!(plain.head_word(), "");
    }

    #[test]
    fn test_change_vp_cat_flattens_adverb() {
        let mut ctx = IdContext::new();
        let quickly = lex_cat(&mut ctx, "quickly", "(S\\NP)\\(S\\NP)").unwrap();

        let flat = change_vp_cat(&quickly);

        assert_eq!(flat.cat_string(), "S\\S");
        assert_eq!(flat.argument().unwrap().cat_string(), "S");
        assert_eq!(flat.result().unwrap().cat_string(), "S");
        assert_eq!(flat.argument().unwrap().deps().len(), 1);
    }

    #[test]
    fn test_reveal_helpers() {
        let mut ctx = IdContext::new();
        let dog = lex_cat_at(&mut ctx, "dog", "N", TokenIndex::new(3)).unwrap();

        let revealed = dog.for_reveal(&mut ctx, "big", "N/N", TokenIndex::new(2)).unwrap();
        assert_eq!(revealed.head_word(), "dog");
        assert_eq!(revealed.result().unwrap().head_word(), "dog");
        let template = revealed.argument().unwrap().deps().iter().next().unwrap();
        assert_eq!(template.head.as_ref().unwrap().category, "N");

        let vp = lex_cat(&mut ctx, "sleeping", "S[ng]\\NP").unwrap();
        let modifier = reveal(&mut ctx, &vp, "NP\\NP").unwrap();
        assert_eq!(modifier.cat_string(), "NP\\NP");
        assert_eq!(modifier.result().unwrap().head_word(), "sleeping");
    }
}
