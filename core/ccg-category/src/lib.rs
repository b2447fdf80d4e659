//! CCG category algebra.
//!
//! Categories are trees of atomic and functor nodes. Each node carries a
//! category id, a head group, the head words it projects, the dependency
//! templates waiting for an argument and, on the root, the dependencies the
//! last rule filled. The combinatory rules build new trees and never modify
//! their operands; ids come from an explicit [`IdContext`].

pub mod category;
pub mod combine;
pub mod context;
pub mod deps;
pub mod error;
pub mod heads;
pub mod lexical;
pub mod parse;
mod render;
pub mod rules;
pub mod special;
pub mod unify;

pub use category::{strings_match, CatRef, Category, NodeIx, Step};
pub use combine::combine;
pub use context::IdContext;
pub use deps::{Dependency, DependencyList, Relation};
pub use error::CategoryError;
pub use heads::{HeadWordList, NO_HEAD_WORD};
pub use lexical::{ccg_cat_from_string, change_vp_cat, lex_cat, lex_cat_at, parse_cat, reveal};
pub use rules::{
    apply, backward_application, backward_composition, backward_crossed_composition, compose,
    conj_final, conj_intermediate, conjunction, coordinate, forward_application,
    forward_composition, punct_conj, punctuation, substitute, topicalize, type_changing_rule,
    type_raise, type_raise_forward_composition, type_raise_to,
};
pub use special::{classify, SpecialCase};
pub use unify::unify;

pub use ccg_protocol::{CatId, Extraction, HeadId, HeadWord, Slash, TokenIndex};
