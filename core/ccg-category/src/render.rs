//! Head-indexed renderings of a category.

use std::collections::BTreeSet;

use ccg_protocol::HeadId;

use crate::category::{CatRef, Category};

impl Category {
    /// Rendering that prints `_headId` on every node whose head group differs
    /// from the root's, and `:B`/`:U` on extracted slots among them.
    ///
    /// `(NP_2\NP_2)/(S[dcl]_3\NP_2:B)_3`
    pub fn cat_string_indexed(&self) -> String {
        let root = self.view();
        match (root.result(), root.argument(), root.slash()) {
            (Some(result), Some(argument), Some(slash)) => {
                let head = root.head_id();
                format!(
                    "{}{}{}",
                    indexed_args(result, head),
                    slash.symbol(),
                    indexed_args(argument, head)
                )
            }
            _ => root.cat_string().to_owned(),
        }
    }

    /// Every node suffixed with `:headId`.
    pub fn cat_string_rec_indexed(&self) -> String {
        rec_indexed(self.view())
    }

    /// Rendering rebuilt from the atomic leaves, complex operands bracketed.
    pub fn cat_string_rec(&self) -> String {
        let root = self.view();
        match (root.result(), root.argument(), root.slash()) {
            (Some(result), Some(argument), Some(slash)) => {
                format!("{}{}{}", bracketed(result), slash.symbol(), bracketed(argument))
            }
            _ => root.cat_string().to_owned(),
        }
    }

    /// `{X<headId>}` rendering with the root's head group written `_`.
    pub fn indexed_cat(&self) -> String {
        let root_head = self.head_id();
        with_head_vars(self.view(), &|head: HeadId| head_label(head, root_head))
    }

    /// [`Category::indexed_cat`] followed by `;;` and the sorted dependency
    /// slots, each as `_ <slot> <head group>`.
    pub fn indexed_cat_with_deps(&self) -> String {
        let root_head = self.head_id();
        let label = |head: HeadId| head_label(head, root_head);
        let mut slots = BTreeSet::new();
        collect_slots(self.view(), &label, &mut slots);
        let slots: Vec<String> = slots.into_iter().collect();
        format!("{};;{}", with_head_vars(self.view(), &label), slots.join(", "))
    }
}

fn head_label(head: HeadId, root_head: HeadId) -> String {
    if head == root_head {
        "_".to_owned()
    } else {
        format!("X{head}")
    }
}

fn extraction_suffix(cat: CatRef<'_>) -> &'static str {
    let extraction = cat.extraction();
    match (extraction.is_extracted(), extraction.is_bounded()) {
        (false, _) => "",
        (true, true) => ":B",
        (true, false) => ":U",
    }
}

fn indexed_args(cat: CatRef<'_>, head: HeadId) -> String {
    let body = match (cat.result(), cat.argument(), cat.slash()) {
        (Some(result), Some(argument), Some(slash)) => format!(
            "({}{}{})",
            indexed_args(result, head),
            slash.symbol(),
            indexed_args(argument, head)
        ),
        _ => cat.cat_string().to_owned(),
    };
    if cat.head_id() == head {
        body
    } else {
        format!("{body}_{}{}", cat.head_id(), extraction_suffix(cat))
    }
}

fn rec_indexed(cat: CatRef<'_>) -> String {
    match (cat.result(), cat.argument(), cat.slash()) {
        (Some(result), Some(argument), Some(slash)) => format!(
            "({}{}{}):{}",
            rec_indexed(result),
            slash.symbol(),
            rec_indexed(argument),
            cat.head_id()
        ),
        _ => format!("{}:{}", cat.cat_string(), cat.head_id()),
    }
}

fn bracketed(cat: CatRef<'_>) -> String {
    match (cat.result(), cat.argument(), cat.slash()) {
        (Some(result), Some(argument), Some(slash)) => {
            format!("({}{}{})", bracketed(result), slash.symbol(), bracketed(argument))
        }
        _ => cat.cat_string().to_owned(),
    }
}

fn with_head_vars(cat: CatRef<'_>, label: &dyn Fn(HeadId) -> String) -> String {
    match (cat.result(), cat.argument(), cat.slash()) {
        (Some(result), Some(argument), Some(slash)) => format!(
            "({}{}{}){{{}}}",
            with_head_vars(result, label),
            slash.symbol(),
            with_head_vars(argument, label),
            label(cat.head_id())
        ),
        _ => format!("{}{{{}}}", cat.cat_string(), label(cat.head_id())),
    }
}

fn collect_slots(cat: CatRef<'_>, label: &dyn Fn(HeadId) -> String, out: &mut BTreeSet<String>) {
    for dep in cat.deps() {
        out.insert(format!("_ {} {}", dep.slot, label(cat.head_id())));
    }
    if let Some(argument) = cat.argument() {
        collect_slots(argument, label, out);
    }
    if let Some(result) = cat.result() {
        collect_slots(result, label, out);
    }
}
