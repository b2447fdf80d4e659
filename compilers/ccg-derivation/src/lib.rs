//! Derivation replay: rebuilds a fixed CCG derivation with the category
//! engine and collects the word-word dependencies it fills.

pub mod derivation;
pub mod error;
pub mod graph;
pub mod replay;

pub use derivation::Derivation;
pub use error::DerivationError;
pub use graph::{DependencyGraph, TokenNode};
pub use replay::{replay, Replayed, Replayer};
