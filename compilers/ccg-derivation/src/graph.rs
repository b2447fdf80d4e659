use std::collections::HashMap;

use ccg_protocol::{DepRel, DependencyTuple, Extraction, TokenIndex};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenNode {
    pub index: TokenIndex,
    pub word: String,
}

/// Word-word dependencies of one sentence. Edges run from the head to the
/// argument and carry the head's category and slot.
pub struct DependencyGraph {
    graph: Graph<TokenNode, DepRel, Directed>,
    index_map: HashMap<TokenIndex, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            index_map: HashMap::new(),
        }
    }

    pub fn add_token(&mut self, index: TokenIndex, word: impl Into<String>) -> NodeIndex {
        if let Some(idx) = self.index_map.get(&index) {
            return *idx;
        }
        let idx = self.graph.add_node(TokenNode {
            index,
            word: word.into(),
        });
        self.index_map.insert(index, idx);
        idx
    }

    /// Adds the edge for `dep`. Tokens not added yet get an empty word.
    pub fn add_dependency(&mut self, dep: &DependencyTuple) {
        let from = self.add_token(dep.head_index, "");
        let to = self.add_token(dep.arg_index, "");
        let extraction = if dep.extracted {
            Extraction::extracted(dep.bounded)
        } else {
            Extraction::empty()
        };
        self.graph.add_edge(
            from,
            to,
            DepRel {
                category: dep.head_category.clone(),
                slot: dep.slot,
                extraction,
            },
        );
    }

    pub fn token_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn word(&self, index: TokenIndex) -> Option<&str> {
        self.index_map.get(&index).map(|idx| self.graph[*idx].word.as_str())
    }

    /// Arguments of `head`, ordered by slot.
    pub fn arguments_of(&self, head: TokenIndex) -> Vec<(TokenIndex, &DepRel)> {
        let mut out = self.neighbours(head, Direction::Outgoing);
        out.sort_by_key(|(index, rel)| (rel.slot, *index));
        out
    }

    /// Words that take `arg` as an argument.
    pub fn heads_of(&self, arg: TokenIndex) -> Vec<(TokenIndex, &DepRel)> {
        self.neighbours(arg, Direction::Incoming)
    }

    fn neighbours(&self, token: TokenIndex, direction: Direction) -> Vec<(TokenIndex, &DepRel)> {
        let Some(idx) = self.index_map.get(&token) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(*idx, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (self.graph[other].index, edge.weight())
            })
            .collect()
    }

    /// Dependencies realized through extraction.
    pub fn long_range(&self) -> Vec<DependencyTuple> {
        self.tuples()
            .into_iter()
            .filter(|dep| dep.extracted)
            .collect()
    }

    /// Every edge as a tuple, in insertion order.
    pub fn tuples(&self) -> Vec<DependencyTuple> {
        self.graph
            .edge_references()
            .map(|edge| {
                let rel = edge.weight();
                DependencyTuple {
                    head_index: self.graph[edge.source()].index,
                    arg_index: self.graph[edge.target()].index,
                    head_category: rel.category.clone(),
                    slot: rel.slot,
                    extracted: rel.extraction.is_extracted(),
                    bounded: rel.extraction.is_bounded(),
                }
            })
            .collect()
    }

    /// Whether `from` reaches `to` along head-to-argument edges.
    pub fn dominates(&self, from: TokenIndex, to: TokenIndex) -> bool {
        match (self.index_map.get(&from), self.index_map.get(&to)) {
            (Some(a), Some(b)) => has_path_connecting(&self.graph, *a, *b, None),
            _ => false,
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(head: u32, arg: u32, slot: u32, extracted: bool) -> DependencyTuple {
        DependencyTuple {
            head_index: TokenIndex::new(head),
            arg_index: TokenIndex::new(arg),
            head_category: "(S[dcl]\\NP)/NP".to_owned(),
            slot,
            extracted,
            bounded: false,
        }
    }

    #[test]
    fn test_edges_by_direction() {
        let mut graph = DependencyGraph::new();
        graph.add_token(TokenIndex::new(0), "John");
        graph.add_token(TokenIndex::new(1), "likes");
        graph.add_token(TokenIndex::new(2), "Mary");
        graph.add_dependency(&tuple(1, 2, 2, false));
        graph.add_dependency(&tuple(1, 0, 1, false));

        let args = graph.arguments_of(TokenIndex::new(1));
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].0, TokenIndex::new(0));
        assert_eq!(args[0].1.slot, 1);
        assert_eq!(args[1].0, TokenIndex::new(2));

        let heads = graph.heads_of(TokenIndex::new(2));
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].0, TokenIndex::new(1));
        assert_eq!(graph.word(TokenIndex::new(1)), Some("likes"));
        assert!(graph.dominates(TokenIndex::new(1), TokenIndex::new(0)));
        assert!(!graph.dominates(TokenIndex::new(0), TokenIndex::new(1)));
    }

    #[test]
    fn test_long_range_filter() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(&tuple(1, 2, 2, true));
        graph.add_dependency(&tuple(1, 0, 1, false));

        assert_eq!(graph.token_count(), 3);
        let long = graph.long_range();
        assert_eq!(long.len(), 1);
        assert_eq!(long[0].arg_index, TokenIndex::new(2));
        assert!(!long[0].bounded);
        assert_eq!(graph.tuples().len(), 2);
        assert!(graph.arguments_of(TokenIndex::new(9)).is_empty());
    }
}
