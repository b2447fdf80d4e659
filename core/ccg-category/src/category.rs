use std::fmt;

use ccg_protocol::{CatId, DependencyTuple, Extraction, HeadId, Slash, TokenIndex};

use crate::context::IdContext;
use crate::deps::DependencyList;
use crate::error::CategoryError;
use crate::heads::HeadWordList;
use crate::parse::{self, CatExpr};

/// Index of a node inside its category's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIx(usize);

/// One step down a complex category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Argument,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Functor {
    pub(crate) slash: Slash,
    pub(crate) result: NodeIx,
    pub(crate) argument: NodeIx,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) cat: String,
    pub(crate) id: CatId,
    pub(crate) head_id: HeadId,
    pub(crate) parent: Option<NodeIx>,
    pub(crate) functor: Option<Functor>,
    pub(crate) heads: HeadWordList,
    /// Dependency templates waiting for this slot to be filled.
    pub(crate) deps: DependencyList,
    /// Dependencies filled by the step that built this node.
    pub(crate) filled: DependencyList,
    pub(crate) extraction: Extraction,
}

impl Node {
    pub(crate) fn new(cat: String, id: CatId, head_id: HeadId) -> Self {
        Self {
            cat,
            id,
            head_id,
            parent: None,
            functor: None,
            heads: HeadWordList::new(),
            deps: DependencyList::new(),
            filled: DependencyList::new(),
            extraction: Extraction::empty(),
        }
    }

    pub(crate) fn has_features(&self) -> bool {
        parse::has_features(&self.cat)
    }

    /// Marks the slot itself (not its templates) as extracted.
    pub(crate) fn mark_extracted(&mut self, bounded: bool) {
        self.extraction = Extraction::extracted(bounded);
    }
}

/// A CCG category: an arena of nodes and the index of its root.
///
/// Children never outlive their category, and `parent` is only used to walk
/// upwards. Subtrees are copied by value, so no two categories share nodes.
#[derive(Debug, Clone)]
pub struct Category {
    nodes: Vec<Node>,
    root: NodeIx,
}

/// Two category strings match when they are equal, are `N` and `NP`, or
/// agree once features are erased.
pub fn strings_match(a: &str, b: &str) -> bool {
    a == b || is_nominal_pair(a, b) || parse::no_features(a) == parse::no_features(b)
}

fn is_nominal_pair(a: &str, b: &str) -> bool {
    (a == "N" && b == "NP") || (a == "NP" && b == "N")
}

impl Category {
    /// Parses a category string. A trailing `[conj]` is dropped.
    pub fn parse(ctx: &mut IdContext, input: &str) -> Result<Category, CategoryError> {
        let text = parse::strip_conj(input);
        let expr = parse::parse_expr(text)?;
        let mut cat = Category {
            nodes: Vec::new(),
            root: NodeIx(0),
        };
        cat.root = cat.build(ctx, &expr, text, None);
        Ok(cat)
    }

    fn build(
        &mut self,
        ctx: &mut IdContext,
        expr: &CatExpr<'_>,
        text: &str,
        parent: Option<NodeIx>,
    ) -> NodeIx {
        let mut node = Node::new(text.to_owned(), ctx.fresh_id(), ctx.fresh_head_id());
        node.parent = parent;
        let ix = self.push(node);
        if let CatExpr::Complex { result, slash, argument, .. } = expr {
            let result = self.build(ctx, result, result.text(), Some(ix));
            let argument = self.build(ctx, argument, argument.text(), Some(ix));
            self.node_mut(ix).functor = Some(Functor {
                slash: *slash,
                result,
                argument,
            });
        }
        ix
    }

    /// A category of a single root node; children are attached by the caller.
    pub(crate) fn from_root(root: Node) -> Category {
        Category {
            nodes: vec![root],
            root: NodeIx(0),
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeIx {
        self.nodes.push(node);
        NodeIx(self.nodes.len() - 1)
    }

    pub fn root(&self) -> NodeIx {
        self.root
    }

    pub fn view(&self) -> CatRef<'_> {
        self.at(self.root)
    }

    pub fn at(&self, ix: NodeIx) -> CatRef<'_> {
        CatRef { cat: self, ix }
    }

    pub(crate) fn node(&self, ix: NodeIx) -> &Node {
        &self.nodes[ix.0]
    }

    pub(crate) fn node_mut(&mut self, ix: NodeIx) -> &mut Node {
        &mut self.nodes[ix.0]
    }

    pub(crate) fn root_mut(&mut self) -> &mut Node {
        let root = self.root;
        self.node_mut(root)
    }

    pub(crate) fn functor(&self, ix: NodeIx) -> Option<Functor> {
        self.node(ix).functor
    }

    pub(crate) fn arg_ix(&self, ix: NodeIx) -> Option<NodeIx> {
        self.functor(ix).map(|f| f.argument)
    }

    pub(crate) fn res_ix(&self, ix: NodeIx) -> Option<NodeIx> {
        self.functor(ix).map(|f| f.result)
    }

    pub(crate) fn parent_ix(&self, ix: NodeIx) -> Option<NodeIx> {
        self.node(ix).parent
    }

    /// Innermost result below `ix`.
    pub(crate) fn target_ix(&self, ix: NodeIx) -> NodeIx {
        let mut cursor = ix;
        while let Some(result) = self.res_ix(cursor) {
            cursor = result;
        }
        cursor
    }

    pub(crate) fn path(&self, from: NodeIx, steps: &[Step]) -> Option<NodeIx> {
        steps.iter().try_fold(from, |ix, step| match step {
            Step::Argument => self.arg_ix(ix),
            Step::Result => self.res_ix(ix),
        })
    }

    pub(crate) fn set_argument(&mut self, ix: NodeIx, child: NodeIx) {
        match self.node_mut(ix).functor.as_mut() {
            Some(f) => f.argument = child,
            None => unreachable!("argument attached to an atomic node"),
        }
        self.node_mut(child).parent = Some(ix);
    }

    pub(crate) fn set_result(&mut self, ix: NodeIx, child: NodeIx) {
        match self.node_mut(ix).functor.as_mut() {
            Some(f) => f.result = child,
            None => unreachable!("result attached to an atomic node"),
        }
        self.node_mut(child).parent = Some(ix);
    }

    /// Copies the subtree under `src` into this arena, below `parent`.
    pub(crate) fn graft(&mut self, src: CatRef<'_>, parent: Option<NodeIx>) -> NodeIx {
        let source = src.node();
        let mut node = source.clone();
        node.parent = parent;
        node.functor = None;
        let ix = self.push(node);
        if let Some(f) = source.functor {
            let result = self.graft(src.at_ix(f.result), Some(ix));
            let argument = self.graft(src.at_ix(f.argument), Some(ix));
            self.node_mut(ix).functor = Some(Functor {
                slash: f.slash,
                result,
                argument,
            });
        }
        ix
    }

    /// Copies the subtree under `src` of this same category below `parent`.
    pub(crate) fn copy_within(&mut self, src: NodeIx, parent: NodeIx) -> NodeIx {
        let subtree = self.at(src).to_category();
        self.graft(subtree.view(), Some(parent))
    }

    /// Makes `ix` the root. Nodes above it become unreachable.
    pub(crate) fn reroot(&mut self, ix: NodeIx) {
        self.node_mut(ix).parent = None;
        self.root = ix;
    }

    /// Deep copy that keeps ids, head groups and flags, and drops nodes no
    /// longer reachable from the root.
    pub fn copy(&self) -> Category {
        self.view().to_category()
    }

    /// Sets the head group of `ix` and of every result below it.
    pub(crate) fn set_head_id_chain(&mut self, ix: NodeIx, head_id: HeadId) {
        let mut cursor = Some(ix);
        while let Some(current) = cursor {
            self.node_mut(current).head_id = head_id;
            cursor = self.res_ix(current);
        }
    }

    /// Rebuilds the strings of `ix` and of every result below it from their
    /// children.
    pub(crate) fn reparse(&mut self, ix: NodeIx) {
        if let Some(f) = self.functor(ix) {
            debug_assert_eq!(self.node(f.result).parent, Some(ix));
            self.reparse(f.result);
            let cat = parse::with_slash(&self.node(f.result).cat, f.slash, &self.node(f.argument).cat);
            self.node_mut(ix).cat = cat;
        }
    }

    /// Overrides the root's rendering string.
    pub(crate) fn relabel(&mut self, cat: &str) {
        self.root_mut().cat = cat.to_owned();
    }

    pub(crate) fn clear_filled(&mut self) {
        self.root_mut().filled.clear();
    }

    pub fn cat_string(&self) -> &str {
        self.view().cat_string()
    }

    pub fn cat_string_no_features(&self) -> String {
        parse::no_features(self.cat_string())
    }

    pub fn id(&self) -> CatId {
        self.view().id()
    }

    pub fn head_id(&self) -> HeadId {
        self.view().head_id()
    }

    pub fn slash(&self) -> Option<Slash> {
        self.view().slash()
    }

    pub fn is_atomic(&self) -> bool {
        self.view().is_atomic()
    }

    pub fn argument(&self) -> Option<CatRef<'_>> {
        self.view().argument()
    }

    pub fn result(&self) -> Option<CatRef<'_>> {
        self.view().result()
    }

    pub fn target(&self) -> CatRef<'_> {
        self.view().target()
    }

    pub fn heads(&self) -> &HeadWordList {
        self.view().heads()
    }

    pub fn head_word(&self) -> &str {
        self.heads().word()
    }

    pub fn head_indices(&self) -> Vec<TokenIndex> {
        self.heads().indices()
    }

    pub fn dependencies(&self) -> &DependencyList {
        self.view().deps()
    }

    /// Dependencies filled by the rule that produced this category.
    pub fn filled_dependencies(&self) -> &DependencyList {
        self.view().filled()
    }

    pub fn dependency_tuples(&self) -> Vec<DependencyTuple> {
        self.filled_dependencies().tuples()
    }

    pub fn matches(&self, other: &Category) -> bool {
        self.view().matches(other.view())
    }

    pub fn matches_str(&self, cat: &str) -> bool {
        self.view().matches_str(cat)
    }

    pub fn is_adjunct_cat(&self) -> bool {
        self.view().is_adjunct_cat()
    }

    /// Number of nodes reachable from the root.
    pub fn size(&self) -> usize {
        self.view().size()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cat_string())
    }
}

/// Read-only cursor on one node of a category.
#[derive(Clone, Copy)]
pub struct CatRef<'a> {
    cat: &'a Category,
    ix: NodeIx,
}

impl<'a> CatRef<'a> {
    pub(crate) fn node(&self) -> &'a Node {
        self.cat.node(self.ix)
    }

    fn at_ix(&self, ix: NodeIx) -> CatRef<'a> {
        CatRef { cat: self.cat, ix }
    }

    pub fn index(&self) -> NodeIx {
        self.ix
    }

    pub fn cat_string(&self) -> &'a str {
        &self.node().cat
    }

    pub fn id(&self) -> CatId {
        self.node().id
    }

    pub fn head_id(&self) -> HeadId {
        self.node().head_id
    }

    pub fn slash(&self) -> Option<Slash> {
        self.node().functor.map(|f| f.slash)
    }

    pub fn is_atomic(&self) -> bool {
        self.node().functor.is_none()
    }

    pub fn is_complex(&self) -> bool {
        !self.is_atomic()
    }

    pub fn is_forward(&self) -> bool {
        self.slash() == Some(Slash::Forward)
    }

    pub fn is_backward(&self) -> bool {
        self.slash() == Some(Slash::Backward)
    }

    pub fn argument(&self) -> Option<CatRef<'a>> {
        self.node().functor.map(|f| self.at_ix(f.argument))
    }

    pub fn result(&self) -> Option<CatRef<'a>> {
        self.node().functor.map(|f| self.at_ix(f.result))
    }

    pub fn parent(&self) -> Option<CatRef<'a>> {
        self.node().parent.map(|p| self.at_ix(p))
    }

    pub fn at(&self, steps: &[Step]) -> Option<CatRef<'a>> {
        self.cat.path(self.ix, steps).map(|ix| self.at_ix(ix))
    }

    pub fn target(&self) -> CatRef<'a> {
        self.at_ix(self.cat.target_ix(self.ix))
    }

    pub fn heads(&self) -> &'a HeadWordList {
        &self.node().heads
    }

    pub fn head_word(&self) -> &'a str {
        self.heads().word()
    }

    pub fn deps(&self) -> &'a DependencyList {
        &self.node().deps
    }

    pub fn filled(&self) -> &'a DependencyList {
        &self.node().filled
    }

    pub fn extraction(&self) -> Extraction {
        self.node().extraction
    }

    pub fn has_features(&self) -> bool {
        self.node().has_features()
    }

    pub fn size(&self) -> usize {
        1 + self.argument().map_or(0, |a| a.size()) + self.result().map_or(0, |r| r.size())
    }

    /// Same category string, `N`/`NP`, one side being the other without
    /// features, or feature-free equality checked node by node.
    pub fn matches(&self, other: CatRef<'_>) -> bool {
        let (a, b) = (self.cat_string(), other.cat_string());
        if a == b || is_nominal_pair(a, b) {
            return true;
        }
        let (bare_a, bare_b) = (parse::no_features(a), parse::no_features(b));
        if bare_a == b || bare_b == a {
            return true;
        }
        bare_a == bare_b && self.matches_recursively(Some(other))
    }

    fn matches_recursively(&self, other: Option<CatRef<'_>>) -> bool {
        let Some(other) = other else {
            return false;
        };
        let (a, b) = (self.cat_string(), other.cat_string());
        if a == b || parse::no_features(a) == b || parse::no_features(b) == a {
            return true;
        }
        match (self.argument(), self.result()) {
            (Some(argument), Some(result)) => {
                argument.matches_recursively(other.argument())
                    && result.matches_recursively(other.result())
            }
            _ => false,
        }
    }

    pub fn matches_str(&self, cat: &str) -> bool {
        strings_match(self.cat_string(), cat)
    }

    /// Argument and result render the same, and the argument carries no
    /// feature other than `[adj]` in first position.
    pub fn is_adjunct_cat(&self) -> bool {
        let (Some(argument), Some(result)) = (self.argument(), self.result()) else {
            return false;
        };
        let arg = argument.cat_string();
        if arg != result.cat_string() {
            return false;
        }
        match arg.find('[') {
            None => true,
            Some(open) => arg[open..].starts_with("[adj]"),
        }
    }

    /// Owned copy of the subtree rooted here.
    pub fn to_category(&self) -> Category {
        let mut out = Category {
            nodes: Vec::with_capacity(self.size()),
            root: NodeIx(0),
        };
        out.root = out.graft(*self, None);
        out
    }
}

impl fmt::Debug for CatRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatRef")
            .field("cat", &self.cat_string())
            .field("id", &self.id())
            .field("head_id", &self.head_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Category {
        Category::parse(&mut IdContext::new(), s).unwrap()
    }

    #[test]
    fn test_parse_builds_tree() {
        let cat = parse("(S[dcl]\\NP)/NP");

        assert_eq!(cat.cat_string(), "(S[dcl]\\NP)/NP");
        assert_eq!(cat.slash(), Some(Slash::Forward));
        assert_eq!(cat.argument().unwrap().cat_string(), "NP");
        let result = cat.result().unwrap();
        assert_eq!(result.cat_string(), "S[dcl]\\NP");
        assert_eq!(result.slash(), Some(Slash::Backward));
        assert_eq!(cat.target().cat_string(), "S[dcl]");
        assert_eq!(cat.size(), 5);
    }

    #[test]
    fn test_parent_links_point_back() {
        let cat = parse("((S\\NP)/(S\\NP))/NP");
        let inner = cat.view().at(&[Step::Result, Step::Argument, Step::Argument]).unwrap();

        assert_eq!(inner.cat_string(), "NP");
        let parent = inner.parent().unwrap();
        assert_eq!(parent.cat_string(), "S\\NP");
        assert_eq!(parent.argument().unwrap().index(), inner.index());
        assert!(cat.view().parent().is_none());
    }

    #[test]
    fn test_fresh_ids_per_node() {
        let mut ctx = IdContext::new();
        let cat = Category::parse(&mut ctx, "S/NP").unwrap();

        assert_eq!(cat.id(), CatId::new(1));
        assert_eq!(cat.result().unwrap().id(), CatId::new(2));
        assert_eq!(cat.argument().unwrap().id(), CatId::new(3));
    }

    #[test]
    fn test_conj_suffix_dropped() {
        let cat = parse("S[dcl]\\NP[conj]");
        assert_eq!(cat.cat_string(), "S[dcl]\\NP");
        assert_eq!(cat.argument().unwrap().cat_string(), "NP");
    }

    #[test]
    fn test_copy_preserves_identity() {
        let cat = parse("(NP\\NP)/(S\\NP)");
        let copy = cat.copy();

        assert_eq!(copy.cat_string(), cat.cat_string());
        assert_eq!(copy.id(), cat.id());
        assert_eq!(copy.argument().unwrap().id(), cat.argument().unwrap().id());
        assert!(copy.matches(&cat));
        assert_eq!(copy.copy().cat_string(), cat.cat_string());
    }

    #[test]
    fn test_matching() {
        let s_dcl = parse("S[dcl]\\NP");
        let s = parse("S\\NP");
        let s_to = parse("S[to]\\NP");

        assert!(s_dcl.matches(&s));
        assert!(s.matches(&s_dcl));
        // Feature-free equal, but S[dcl] and S[to] disagree node by node.
        assert!(!s_dcl.matches(&s_to));
        assert!(s_dcl.matches_str("S[to]\\NP"));
        assert!(parse("N").matches(&parse("NP")));
        assert!(!parse("NP").matches(&parse("S")));
    }

    #[test]
    fn test_adjunct_detection() {
        assert!(parse("N/N").is_adjunct_cat());
        assert!(parse("(S\\NP)\\(S\\NP)").is_adjunct_cat());
        assert!(parse("S[adj]/S[adj]").is_adjunct_cat());
        assert!(!parse("S[dcl]/S[dcl]").is_adjunct_cat());
        assert!(!parse("NP/N").is_adjunct_cat());
        assert!(!parse("N").is_adjunct_cat());
    }

    #[test]
    fn test_reparse_after_edit() {
        let mut cat = parse("(S\\NP)/NP");
        let result = cat.res_ix(cat.root()).unwrap();
        let target = cat.res_ix(result).unwrap();
        cat.node_mut(target).cat = "S[dcl]".to_owned();

        let root = cat.root();
        cat.reparse(root);

        assert_eq!(cat.cat_string(), "(S[dcl]\\NP)/NP");
    }
}
