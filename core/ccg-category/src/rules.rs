//! Combinatory rules. Every rule copies its operands and returns a new
//! category, or `None` when it does not apply.

use ccg_protocol::Slash;

use crate::category::{Category, CatRef, Functor, Node, NodeIx};
use crate::context::IdContext;
use crate::deps::DependencyList;
use crate::error::CategoryError;
use crate::heads::HeadWordList;
use crate::parse;
use crate::unify::{unify, Pattern};

/// Category strings that punctuation absorbs.
pub const PUNCTUATION: [&str; 8] = [",", ".", ";", ":", "RRB", "LRB", "``", "''"];

/// Category strings that can mark a conjunct.
pub const CONJUNCTIONS: [&str; 7] = ["conj", ",", ";", ":", ".", "LRB", "RRB"];

const VP: &str = "S\\NP";

/// Function application: `X|Y Y => X`.
///
/// Unifies the functor's argument with `arg` and substitutes the unified
/// category through a copy of the functor's result.
pub fn apply(ctx: &mut IdContext, functor: &Category, arg: &Category) -> Option<Category> {
    let f = functor.view();
    let (f_arg, f_res) = (f.argument()?, f.result()?);
    if !f_arg.matches(arg.view()) {
        return None;
    }
    let mut result = f_res.to_category();
    let unified = unify(ctx, f_arg, arg.view());
    result.substitute_unified(Pattern::Foreign(f_arg), unified.view());
    result.root_mut().filled = unified.view().filled().clone();
    if f.is_forward() && f.cat_string() == "NP[nb]/N" {
        result.relabel("NP");
    }
    Some(result)
}

/// Generalized composition: `X|Y Y|Z... => X|Z...`.
///
/// Walks down `arg`'s results until one matches the functor's argument and
/// puts the functor's result in its place.
pub fn compose(ctx: &mut IdContext, functor: &Category, arg: &Category) -> Option<Category> {
    let f = functor.view();
    let f_arg = f.argument()?;

    let mut out = arg.copy();
    if !f.heads().is_empty() {
        let heads = if f.is_adjunct_cat() {
            arg.heads().clone()
        } else {
            f.heads().clone()
        };
        out.root_mut().heads = heads;
    }

    let mut tmp = out.root();
    let chain = loop {
        let result = out.res_ix(tmp)?;
        if out.at(result).matches(f_arg) {
            break result;
        }
        tmp = result;
    };

    let mut functor_copy = functor.copy();
    let fc_root = functor_copy.root();
    let fc_arg = functor_copy.arg_ix(fc_root)?;
    let fc_res = functor_copy.res_ix(fc_root)?;
    let unified = unify(ctx, functor_copy.at(fc_arg), out.at(chain));
    functor_copy.substitute_unified(Pattern::Own(fc_arg), unified.view());
    out.substitute_unified(Pattern::Own(chain), unified.view());

    let spliced = out.graft(functor_copy.at(fc_res), Some(tmp));
    out.set_result(tmp, spliced);
    out.root_mut().filled = unified.view().filled().clone();
    let root = out.root();
    out.reparse(root);

    let new_head = functor_copy.at(fc_res);
    let mut cursor = Some(tmp);
    while let Some(ix) = cursor {
        let node = out.node_mut(ix);
        if !new_head.heads().is_empty() {
            node.heads = new_head.heads().clone();
        }
        node.head_id = new_head.head_id();
        cursor = node.parent;
    }
    Some(out.copy())
}

/// Coordination: `X X[conj] => X`. Heads and templates are concatenated
/// node by node, left first.
pub fn coordinate(left: &Category, right: &Category) -> Option<Category> {
    coordinate_views(left.view(), right.view())
}

fn coordinate_views(left: CatRef<'_>, right: CatRef<'_>) -> Option<Category> {
    if !left.matches_str(right.cat_string()) {
        return None;
    }
    let mut out = left.to_category();
    out.clear_filled();
    let root = out.root();
    out.adjust_long_range_rnr(root);
    out.coordinate_rec(root, right);
    Some(out.copy())
}

/// Substitution: `(X\Y)/Z Y/Z => X/Z`.
///
/// The two `Z` are coordinated into one shared argument and the two `Y`
/// unified.
pub fn substitute(ctx: &mut IdContext, functor: &Category, arg: &Category) -> Option<Category> {
    let (c1, c2) = (functor.view(), arg.view());
    let z1 = c1.argument()?;
    let y1 = c1.result()?.argument()?;
    let x1 = c1.result()?.result()?;
    let z2 = c2.argument()?;
    let y2 = c2.result()?;
    if !(z1.matches(z2) && y1.matches(x1) && y1.matches(y2)) {
        return None;
    }

    let mut functor = functor.copy();
    let mut arg = arg.copy();
    let root = functor.root();
    let z1 = functor.arg_ix(root)?;
    let inner = functor.res_ix(root)?;
    let y1 = functor.arg_ix(inner)?;
    let arg_root = arg.root();
    let z2 = arg.arg_ix(arg_root)?;
    let y2 = arg.res_ix(arg_root)?;

    let z3 = coordinate_views(functor.at(z1), arg.at(z2))?;
    let (z1_id, z1_head) = (functor.node(z1).id, functor.node(z1).head_id);
    functor.replace_ids(root, z1_id, z1_head, z3.view());
    let (z2_id, z2_head) = (arg.node(z2).id, arg.node(z2).head_id);
    arg.replace_ids(arg_root, z2_id, z2_head, z3.view());

    let y3 = unify(ctx, functor.at(y1), arg.at(y2));
    functor.substitute_unified(Pattern::Own(y1), y3.view());

    // X\Y becomes X/Z: the inner node takes the outer slash and argument.
    let slash = functor.slash().unwrap_or(Slash::Forward);
    let x = functor.res_ix(inner)?;
    functor.node_mut(inner).functor = Some(Functor {
        slash,
        result: x,
        argument: z1,
    });
    functor.node_mut(z1).parent = Some(inner);
    functor.reroot(inner);
    functor.reparse(inner);
    functor.root_mut().filled = y3.view().filled().clone();

    let head_source = functor.at(x);
    if !head_source.heads().is_empty() {
        let (heads, head_id) = (head_source.heads().clone(), head_source.head_id());
        let node = functor.root_mut();
        node.heads = heads;
        node.head_id = head_id;
    }
    Some(functor.copy())
}

/// `X punct => X`, `punct X => X`.
pub fn punctuation(cat: &Category, punct: &Category) -> Option<Category> {
    pass_through(cat, punct, &PUNCTUATION)
}

/// `conj X => X`, the first half of a coordination.
pub fn conjunction(cat: &Category, conj: &Category) -> Option<Category> {
    pass_through(cat, conj, &CONJUNCTIONS)
}

fn pass_through(cat: &Category, marker: &Category, markers: &[&str]) -> Option<Category> {
    if !markers.contains(&marker.cat_string()) {
        return None;
    }
    let mut out = cat.copy();
    out.clear_filled();
    Some(out)
}

/// `X => T|(T|X)`: forward gives `T/(T\X)`, backward `T\(T/X)`.
pub fn type_raise(ctx: &mut IdContext, x: &Category, t: &str, direction: Slash) -> Result<Category, CategoryError> {
    let (inner, outer) = match direction {
        Slash::Forward => (Slash::Backward, Slash::Forward),
        Slash::Backward => (Slash::Forward, Slash::Backward),
    };
    raise(ctx, x, t, inner, outer)
}

/// `X => S/(S/X)`.
pub fn topicalize(ctx: &mut IdContext, x: &Category, s: &str) -> Result<Category, CategoryError> {
    raise(ctx, x, s, Slash::Forward, Slash::Forward)
}

fn raise(
    ctx: &mut IdContext,
    x: &Category,
    t: &str,
    inner: Slash,
    outer: Slash,
) -> Result<Category, CategoryError> {
    let mut t_cat = Category::parse(ctx, t)?;
    let t_head = ctx.fresh_head_id();
    let t_root = t_cat.root();
    t_cat.set_head_id_chain(t_root, t_head);

    let inner_id = ctx.fresh_id();
    let outer_id = ctx.fresh_id();
    let inner_cat = parse::with_slash(t_cat.cat_string(), inner, x.cat_string());
    let outer_cat = parse::with_slash(t_cat.cat_string(), outer, &inner_cat);

    let mut root = Node::new(outer_cat, outer_id, x.head_id());
    root.heads = x.heads().clone();
    let mut raised = Category::from_root(root);
    let root = raised.root();

    let mut argument = Node::new(inner_cat, inner_id, t_head);
    argument.parent = Some(root);
    let argument = raised.push(argument);
    let result = raised.graft(t_cat.view(), Some(root));
    raised.node_mut(root).functor = Some(Functor {
        slash: outer,
        result,
        argument,
    });

    // T appears twice; both copies keep one id so unification treats them as one.
    let inner_result = raised.graft(t_cat.view(), Some(argument));
    let inner_argument = raised.graft(x.view(), Some(argument));
    raised.node_mut(argument).functor = Some(Functor {
        slash: inner,
        result: inner_result,
        argument: inner_argument,
    });
    Ok(raised)
}

/// Type-raises or topicalizes `x` into `target` when `target` has the
/// shape `T|(T|X)` or is `S/(S/NP)`.
pub fn type_raise_to(ctx: &mut IdContext, x: &Category, target: &str) -> Result<Option<Category>, CategoryError> {
    if target == "S/(S/NP)" {
        return topicalize(ctx, x, "S").map(Some);
    }
    if !(target.contains('/') && target.contains('\\')) {
        return Ok(None);
    }
    let shape = Category::parse(ctx, target)?;
    let view = shape.view();
    let (Some(result), Some(slash)) = (view.result(), view.slash()) else {
        return Ok(None);
    };
    let raised_over = view.argument().and_then(|a| a.result());
    match raised_over {
        Some(inner) if inner.cat_string() == result.cat_string() => {
            type_raise(ctx, x, result.cat_string(), slash).map(Some)
        }
        _ => Ok(None),
    }
}

/// Unary type change of `dtr` into a freshly built `target` category.
///
/// The new category keeps `dtr`'s heads. When the argument slots line up,
/// `dtr`'s argument templates move over as extracted dependencies.
pub fn type_changing_rule(ctx: &mut IdContext, dtr: &Category, target: &str) -> Result<Category, CategoryError> {
    let mut out = Category::parse(ctx, target)?;
    let root = out.root();
    let head_id = out.head_id();
    let target_ix = out.target_ix(root);
    out.assign_heads_deps(ctx, target_ix, 1, &HeadWordList::new(), head_id);
    if !dtr.heads().is_empty() {
        out.root_mut().heads = dtr.heads().clone();
    }
    out.clear_filled();

    let d = dtr.view();
    let dtr_cat = d.cat_string();
    let d_arg = d.argument();

    let slots_line_up = match (out.arg_ix(root), d_arg) {
        (Some(argument), Some(dtr_arg)) => {
            out.at(argument).matches_str(dtr_arg.cat_string())
                && !(dtr_cat == "S[to]\\NP" && target == "NP\\NP")
                && dtr_cat != "S[dcl]\\NP"
                && dtr_cat != "S[b]\\NP"
        }
        _ => false,
    };

    if slots_line_up || (dtr_cat == "(S\\NP)\\(S\\NP)" && target == "S\\S") {
        if let (Some(argument), Some(dtr_arg)) = (out.arg_ix(root), d_arg) {
            if !dtr_arg.deps().is_empty() {
                let mut deps = dtr_arg.deps().clone();
                mark_by_direction(&mut deps, d.slash());
                out.node_mut(argument).deps = deps;
            }
        }
    } else if d.matches_str(VP) {
        // VP => VP adjunct: the adjunct's subject slots take dtr's subject templates.
        let argument = out.arg_ix(root);
        let result = out.res_ix(root);
        if let (Some(argument), Some(result), Some(dtr_arg)) = (argument, result, d_arg) {
            let lines_up = out.at(argument).matches_str(dtr_cat) && out.at(result).matches_str(dtr_cat);
            if lines_up && !dtr_arg.deps().is_empty() {
                let mut deps = dtr_arg.deps().clone();
                deps.mark_extracted(true);
                for owner in [argument, result] {
                    if let Some(subject) = out.arg_ix(owner) {
                        out.node_mut(subject).deps = deps.clone();
                    }
                }
            }
        }
    }
    Ok(out)
}

fn mark_by_direction(deps: &mut DependencyList, slash: Option<Slash>) {
    match slash {
        Some(Slash::Forward) => deps.mark_unbounded(),
        Some(Slash::Backward) => deps.mark_extracted(true),
        None => {}
    }
}

impl Category {
    /// Right node raising: forward arguments along the result spine become
    /// unbounded long-range dependencies.
    pub(crate) fn adjust_long_range_rnr(&mut self, ix: NodeIx) {
        let mut cursor = Some(ix);
        while let Some(current) = cursor {
            let Some(f) = self.functor(current) else {
                return;
            };
            if f.slash != Slash::Forward || self.node(f.argument).deps.is_empty() {
                return;
            }
            self.node_mut(f.argument).deps.mark_unbounded();
            cursor = Some(f.result);
        }
    }

    /// Left node raising: past the leading forward arguments, backward
    /// arguments become unbounded long-range dependencies.
    pub fn adjust_long_range_lnr(&mut self) {
        let mut tmp = self.root();
        if self.view().is_forward() {
            while let Some(f) = self.functor(tmp) {
                if f.slash != Slash::Forward {
                    break;
                }
                tmp = f.result;
            }
        }
        let mut cursor = Some(tmp);
        while let Some(current) = cursor {
            let Some(f) = self.functor(current) else {
                return;
            };
            if f.slash != Slash::Backward || self.node(f.argument).deps.is_empty() {
                return;
            }
            self.node_mut(f.argument).deps.mark_unbounded();
            cursor = Some(f.result);
        }
    }

    fn coordinate_rec(&mut self, ix: NodeIx, other: CatRef<'_>) {
        if let Some(f) = self.functor(ix) {
            if let Some(other_arg) = other.argument() {
                self.coordinate_rec(f.argument, other_arg);
            }
            if self.node(f.result).id == self.node(f.argument).id {
                let result = self.copy_within(f.argument, ix);
                self.node_mut(result).deps.clear();
                self.set_result(ix, result);
            } else if let Some(other_res) = other.result() {
                self.coordinate_rec(f.result, other_res);
            }
        }
        let node = self.node_mut(ix);
        node.heads.append(other.heads());
        node.deps.append(other.deps());
    }
}

/// `X/Y Y => X`, only for a forward functor on the left.
pub fn forward_application(ctx: &mut IdContext, left: &Category, right: &Category) -> Option<Category> {
    left.view().is_forward().then(|| apply(ctx, left, right)).flatten()
}

/// `Y X\Y => X`.
pub fn backward_application(ctx: &mut IdContext, left: &Category, right: &Category) -> Option<Category> {
    right.view().is_backward().then(|| apply(ctx, right, left)).flatten()
}

pub fn forward_composition(ctx: &mut IdContext, left: &Category, right: &Category) -> Option<Category> {
    left.view().is_forward().then(|| compose(ctx, left, right)).flatten()
}

pub fn backward_composition(ctx: &mut IdContext, left: &Category, right: &Category) -> Option<Category> {
    right.view().is_backward().then(|| compose(ctx, right, left)).flatten()
}

/// `Y/Z X\Y => X/Z`, requiring the right argument to match the left result.
pub fn backward_crossed_composition(ctx: &mut IdContext, left: &Category, right: &Category) -> Option<Category> {
    let (l, r) = (left.view(), right.view());
    if !(r.is_backward() && l.is_forward()) {
        return None;
    }
    let crosses = match (r.argument(), l.result()) {
        (Some(r_arg), Some(l_res)) => r_arg.matches(l_res),
        _ => false,
    };
    crosses.then(|| compose(ctx, right, left)).flatten()
}

/// Type-raises `left` over `t` and composes it forward with `right`.
pub fn type_raise_forward_composition(
    ctx: &mut IdContext,
    left: &Category,
    right: &Category,
    t: &str,
    direction: Slash,
) -> Result<Option<Category>, CategoryError> {
    let raised = type_raise(ctx, left, t, direction)?;
    Ok(forward_composition(ctx, &raised, right))
}

/// `conj X => X[conj]`.
pub fn conj_intermediate(ctx: &mut IdContext, left: &Category, right: &Category) -> Result<Option<Category>, CategoryError> {
    if left.cat_string() != "conj" {
        return Ok(None);
    }
    let Some(mut out) = conjunction(right, left) else {
        return Ok(None);
    };
    out.adjust_long_range_lnr();
    let mut target = out.cat_string().to_owned();
    if !target.ends_with(parse::CONJ_FEATURE) {
        target.push_str(parse::CONJ_FEATURE);
    }
    if !out.matches_str(&target) {
        out = type_changing_rule(ctx, right, &target)?;
    }
    out.relabel(&target);
    Ok(Some(out))
}

/// `X X[conj] => X`, with `, X[conj] => X` as a fallback.
pub fn conj_final(ctx: &mut IdContext, left: &Category, right: &Category) -> Result<Option<Category>, CategoryError> {
    if !right.cat_string().ends_with(parse::CONJ_FEATURE) {
        return Ok(None);
    }
    if let Some(out) = coordinate(left, right) {
        return Ok(Some(out));
    }
    if left.cat_string() != "," {
        return Ok(None);
    }
    let Some(mut out) = punctuation(right, left) else {
        return Ok(None);
    };
    let target = right.cat_string().replace(parse::CONJ_FEATURE, "");
    if !out.matches_str(&target) {
        out = type_changing_rule(ctx, left, &target)?;
    }
    out.relabel(&target);
    Ok(Some(out))
}

/// `, X => X[conj]`.
pub fn punct_conj(left: &Category, right: &Category) -> Option<Category> {
    conjunction(right, left)
}
