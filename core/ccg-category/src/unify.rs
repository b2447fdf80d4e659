//! Unification of matching categories and substitution of the unified
//! result back into the trees that referenced the operands.

use ccg_protocol::{CatId, HeadId};

use crate::category::{strings_match, CatRef, Category, Node, NodeIx};
use crate::context::IdContext;
use crate::deps::DependencyList;

/// Unifies two matching categories into a fresh tree.
///
/// The operand carrying a morphological feature is the base (`b` when both
/// or neither do). The base is copied, its root gets a fresh id, and the
/// other operand's heads, templates and extraction state are merged in.
/// The root's filled list holds the base's still-unfilled entries followed by
/// every dependency the merge filled. Neither operand is modified.
pub fn unify(ctx: &mut IdContext, a: CatRef<'_>, b: CatRef<'_>) -> Category {
    let (base, other) = if b.has_features() { (b, a) } else { (a, b) };
    let mut unified = base.to_category();
    let root = unified.root();
    unified.node_mut(root).id = ctx.fresh_id();
    let mut filled = unified.node(root).filled.unfilled();
    unified.merge_with(root, other, &mut filled);
    unified.node_mut(root).filled = filled;
    unified
}

impl Node {
    /// Fills every template against every head. Templates stay put while the
    /// node has no head.
    pub(crate) fn fill_dependencies(&mut self, filled: &mut DependencyList) {
        if self.deps.is_empty() || self.heads.is_empty() {
            return;
        }
        filled.append(&self.deps.instantiate(&self.heads));
        self.deps.clear();
    }
}

/// The side of a substitution whose ids are looked up in the target tree.
#[derive(Clone, Copy)]
pub(crate) enum Pattern<'a> {
    /// A node of the tree being rewritten; its ids are read as they stand
    /// when each pair is applied.
    Own(NodeIx),
    Foreign(CatRef<'a>),
}

impl Category {
    pub(crate) fn merge_with(&mut self, ix: NodeIx, other: CatRef<'_>, filled: &mut DependencyList) {
        if !self.node(ix).has_features() && other.has_features() {
            self.node_mut(ix).cat = other.cat_string().to_owned();
        }

        if let (Some(f), Some(other_arg), Some(other_res)) =
            (self.functor(ix), other.argument(), other.result())
        {
            let shared_here = self.node(f.argument).id == self.node(f.result).id;
            if shared_here || other_arg.id() == other_res.id() {
                self.merge_with(f.argument, other_arg, filled);
                let result = self.copy_within(f.argument, ix);
                self.set_result(ix, result);
            } else {
                self.merge_with(f.argument, other_arg, filled);
                self.merge_with(f.result, other_res, filled);
            }
        }

        let other_extraction = other.extraction();
        let mut incoming = other.deps().clone();
        let node = self.node_mut(ix);
        // Either side unbounded makes the other side's templates unbounded.
        let bounded = node.extraction.is_bounded() && other_extraction.is_bounded();

        if other_extraction.is_extracted() && !node.deps.is_empty() {
            node.deps.mark_extracted(bounded);
        }
        if node.extraction.is_extracted() && !incoming.is_empty() {
            incoming.mark_extracted(bounded);
        }

        if node.heads.is_empty() && !other.heads().is_empty() {
            node.heads = other.heads().clone();
            node.head_id = other.head_id();
        } else {
            node.heads.append(other.heads());
        }
        node.fill_dependencies(filled);

        if node.deps.is_empty() {
            if !incoming.is_empty() {
                node.deps = incoming;
                node.fill_dependencies(filled);
            }
        } else if !incoming.is_empty() {
            if node.extraction.is_extracted() {
                incoming.mark_extracted(bounded);
            }
            node.deps.append(&incoming);
            node.fill_dependencies(filled);
        }
    }

    /// Rewrites every node of the tree below `ix` that stands for
    /// `(cat_id, head_id)` with the content of `unified`.
    ///
    /// A node with id `cat_id` takes `unified`'s identity, heads, templates and
    /// extraction, and its children are left alone. A node that only shares
    /// the head group takes `unified`'s head group, its heads when it has
    /// none, and its templates when the strings match.
    pub(crate) fn replace_ids(&mut self, ix: NodeIx, cat_id: CatId, head_id: HeadId, unified: CatRef<'_>) {
        let node = self.node_mut(ix);
        if node.id == cat_id {
            node.id = unified.id();
            node.head_id = unified.head_id();
            if !node.has_features() && unified.has_features() {
                node.cat = unified.cat_string().to_owned();
            }
            if !unified.heads().is_empty() {
                node.heads = unified.heads().clone();
            }
            node.deps = unified.deps().clone();
            let extraction = unified.extraction();
            if extraction.is_extracted() {
                node.mark_extracted(extraction.is_bounded());
            }
            return;
        }

        if node.head_id == head_id && node.id != unified.id() {
            if node.heads.is_empty() && !unified.heads().is_empty() {
                node.heads = unified.heads().clone();
            }
            node.head_id = unified.head_id();
            if strings_match(&node.cat, unified.cat_string()) {
                node.deps.append(unified.deps());
            }
        }

        if let Some(f) = self.functor(ix) {
            self.replace_ids(f.argument, cat_id, head_id, unified);
            self.replace_ids(f.result, cat_id, head_id, unified);
        }
    }

    /// Applies `replace_ids` for every node pair of `pattern` and `unified`,
    /// argument side first, then result side, then the pair itself.
    pub(crate) fn substitute_unified(&mut self, pattern: Pattern<'_>, unified: CatRef<'_>) {
        let children = match pattern {
            Pattern::Own(ix) => self
                .functor(ix)
                .map(|f| (Pattern::Own(f.argument), Pattern::Own(f.result))),
            Pattern::Foreign(cat) => match (cat.argument(), cat.result()) {
                (Some(a), Some(r)) => Some((Pattern::Foreign(a), Pattern::Foreign(r))),
                _ => None,
            },
        };
        if let Some((argument, result)) = children {
            if let Some(unified_arg) = unified.argument() {
                self.substitute_unified(argument, unified_arg);
            }
            if let Some(unified_res) = unified.result() {
                self.substitute_unified(result, unified_res);
            }
        }

        let (cat_id, head_id) = match pattern {
            Pattern::Own(ix) => (self.node(ix).id, self.node(ix).head_id),
            Pattern::Foreign(cat) => (cat.id(), cat.head_id()),
        };
        let root = self.root();
        self.replace_ids(root, cat_id, head_id, unified);
    }
}
