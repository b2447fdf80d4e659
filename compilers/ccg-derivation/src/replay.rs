use ccg_category::{combine, lex_cat_at, rules, Category, IdContext};
use ccg_protocol::{DependencyTuple, SentenceDependencies, TokenIndex};
use log::debug;

use crate::derivation::Derivation;
use crate::error::DerivationError;
use crate::graph::DependencyGraph;

/// A derivation rebuilt by the engine.
#[derive(Debug, Clone)]
pub struct Replayed {
    /// Category at the root of the derivation.
    pub category: Category,
    pub tokens: Vec<(TokenIndex, String)>,
    /// Every dependency filled on the way up, bottom-up and left to right.
    pub dependencies: Vec<DependencyTuple>,
}

impl Replayed {
    pub fn graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (index, word) in &self.tokens {
            graph.add_token(*index, word.as_str());
        }
        for dep in &self.dependencies {
            graph.add_dependency(dep);
        }
        graph
    }

    pub fn to_sentence(&self) -> SentenceDependencies {
        SentenceDependencies {
            words: self.tokens.iter().map(|(_, word)| word.clone()).collect(),
            category: self.category.cat_string().to_owned(),
            dependencies: self.dependencies.clone(),
        }
    }
}

/// Replays derivations one sentence at a time. Each sentence gets a fresh
/// id context, so replays are reproducible.
#[derive(Debug, Default)]
pub struct Replayer {
    ctx: IdContext,
    position: u32,
    tokens: Vec<(TokenIndex, String)>,
    dependencies: Vec<DependencyTuple>,
}

impl Replayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replay(&mut self, derivation: &Derivation) -> Result<Replayed, DerivationError> {
        self.ctx.reset();
        self.position = 0;
        self.tokens.clear();
        self.dependencies.clear();

        let category = self.step(derivation)?;
        Ok(Replayed {
            category,
            tokens: std::mem::take(&mut self.tokens),
            dependencies: std::mem::take(&mut self.dependencies),
        })
    }

    fn step(&mut self, node: &Derivation) -> Result<Category, DerivationError> {
        match node {
            Derivation::Leaf { word, category, index } => {
                let index = TokenIndex::new(index.unwrap_or(self.position));
                self.position += 1;
                debug!("leaf {} {} at {}", word, category, index);
                self.tokens.push((index, word.clone()));
                Ok(lex_cat_at(&mut self.ctx, word, category, index)?)
            }
            Derivation::Unary { category, child } => {
                let child = self.step(child)?;
                self.unary(child, category)
            }
            Derivation::Binary { category, left, right } => {
                let left = self.step(left)?;
                let right = self.step(right)?;
                debug!("binary {} + {} => {}", left, right, category);
                let out = combine(&mut self.ctx, &left, &right, category)?.ok_or_else(|| {
                    DerivationError::NoCombination {
                        left: left.cat_string().to_owned(),
                        right: right.cat_string().to_owned(),
                        target: category.clone(),
                    }
                })?;
                self.dependencies.extend(out.dependency_tuples());
                Ok(out)
            }
        }
    }

    /// Identity, type-raising, or a type change, in that order.
    fn unary(&mut self, child: Category, target: &str) -> Result<Category, DerivationError> {
        if child.cat_string() == target {
            return Ok(child);
        }
        debug!("unary {} => {}", child, target);
        let out = match rules::type_raise_to(&mut self.ctx, &child, target)? {
            Some(raised) => raised,
            None => rules::type_changing_rule(&mut self.ctx, &child, target)?,
        };
        if !out.matches_str(target) {
            return Err(DerivationError::NoUnary {
                child: child.cat_string().to_owned(),
                target: target.to_owned(),
            });
        }
        Ok(out)
    }
}

/// Replays one derivation with a fresh replayer.
pub fn replay(derivation: &Derivation) -> Result<Replayed, DerivationError> {
    Replayer::new().replay(derivation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john_likes_mary() -> Derivation {
        Derivation::binary(
            "S[dcl]",
            Derivation::leaf("John", "NP"),
            Derivation::binary(
                "S[dcl]\\NP",
                Derivation::leaf("likes", "(S[dcl]\\NP)/NP"),
                Derivation::leaf("Mary", "NP"),
            ),
        )
    }

    #[test]
    fn test_transitive_sentence_graph() {
        let replayed = replay(&john_likes_mary()).unwrap();
        assert_eq!(replayed.category.cat_string(), "S[dcl]");
        assert_eq!(replayed.category.head_word(), "likes");
        assert_eq!(replayed.dependencies.len(), 2);

        let graph = replayed.graph();
        let args = graph.arguments_of(TokenIndex::new(1));
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].0, TokenIndex::new(0));
        assert_eq!(args[0].1.slot, 1);
        assert_eq!(args[1].0, TokenIndex::new(2));
        assert_eq!(args[1].1.slot, 2);
        assert_eq!(args[1].1.category, "(S[dcl]\\NP)/NP");
        assert!(graph.long_range().is_empty());
    }

    #[test]
    fn test_sentence_report() {
        let sentence = replay(&john_likes_mary()).unwrap().to_sentence();
        assert_eq!(sentence.words, vec!["John", "likes", "Mary"]);
        assert_eq!(sentence.category, "S[dcl]");
        assert_eq!(sentence.dependencies.len(), 2);
    }

    #[test]
    fn test_replays_are_reproducible() {
        let mut replayer = Replayer::new();
        let first = replayer.replay(&john_likes_mary()).unwrap();
        let second = replayer.replay(&john_likes_mary()).unwrap();
        assert_eq!(first.dependencies, second.dependencies);
        assert_eq!(first.category.id(), second.category.id());
    }

    #[test]
    fn test_unary_type_raise_and_change() {
        let raised = Derivation::binary(
            "S[dcl]",
            Derivation::unary("S/(S\\NP)", Derivation::leaf("John", "NP")),
            Derivation::leaf("sleeps", "S[dcl]\\NP"),
        );
        let replayed = replay(&raised).unwrap();
        assert_eq!(replayed.category.cat_string(), "S[dcl]");

        let bare = Derivation::unary("NP", Derivation::leaf("dogs", "N"));
        let replayed = replay(&bare).unwrap();
        assert_eq!(replayed.category.cat_string(), "NP");
        assert_eq!(replayed.category.head_word(), "dogs");
    }

    #[test]
    fn test_impossible_step_is_reported() {
        let bad = Derivation::binary(
            "S[dcl]",
            Derivation::leaf("Mary", "NP"),
            Derivation::leaf("John", "NP"),
        );
        match replay(&bad) {
            Err(DerivationError::NoCombination { left, right, target }) => {
                assert_eq!(left, "NP");
                assert_eq!(right, "NP");
                assert_eq!(target, "S[dcl]");
            }
            other => panic!("unexpected {other:?}"),
        }

        let malformed = Derivation::leaf("x", "(NP");
        assert!(matches!(replay(&malformed), Err(DerivationError::Category(_))));
    }
}
