use rkyv::{Archive, Deserialize, Serialize};
use crate::grammar::Extraction;
use crate::ids::TokenIndex;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A lexical head: the word, the category it was assigned, and its position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct HeadWord {
    pub word: String,
    pub category: String,
    pub index: TokenIndex,
}

impl HeadWord {
    pub fn new(word: impl Into<String>, category: impl Into<String>, index: TokenIndex) -> Self {
        Self {
            word: word.into(),
            category: category.into(),
            index,
        }
    }
}

/// Label of a word-word dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct DepRel {
    /// Lexical category of the head word.
    pub category: String,
    /// Argument slot of that category, counted from 1.
    pub slot: u32,
    pub extraction: Extraction,
}

/// A resolved dependency as seen from outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct DependencyTuple {
    pub head_index: TokenIndex,
    pub arg_index: TokenIndex,
    pub head_category: String,
    pub slot: u32,
    pub extracted: bool,
    pub bounded: bool,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct SentenceDependencies {
    pub words: Vec<String>,
    /// Category the derivation ends in.
    pub category: String,
    pub dependencies: Vec<DependencyTuple>,
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
pub struct DependencyReport {
    pub version: u32,
    pub sentences: Vec<SentenceDependencies>,
}
