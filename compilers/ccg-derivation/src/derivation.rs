use serde::{Deserialize, Serialize};

/// A fixed derivation tree: lexical leaves and the rule steps above them,
/// each labelled with the category it must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    Leaf {
        word: String,
        category: String,
        /// Token position; leaves without one are numbered left to right.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<u32>,
    },
    Unary {
        category: String,
        child: Box<Derivation>,
    },
    Binary {
        category: String,
        left: Box<Derivation>,
        right: Box<Derivation>,
    },
}

impl Derivation {
    pub fn leaf(word: impl Into<String>, category: impl Into<String>) -> Self {
        Derivation::Leaf {
            word: word.into(),
            category: category.into(),
            index: None,
        }
    }

    pub fn unary(category: impl Into<String>, child: Derivation) -> Self {
        Derivation::Unary {
            category: category.into(),
            child: Box::new(child),
        }
    }

    pub fn binary(category: impl Into<String>, left: Derivation, right: Derivation) -> Self {
        Derivation::Binary {
            category: category.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Category this node produces.
    pub fn category(&self) -> &str {
        match self {
            Derivation::Leaf { category, .. }
            | Derivation::Unary { category, .. }
            | Derivation::Binary { category, .. } => category,
        }
    }

    /// Words of the leaves, left to right.
    pub fn words(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_words(&mut out);
        out
    }

    fn collect_words<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Derivation::Leaf { word, .. } => out.push(word),
            Derivation::Unary { child, .. } => child.collect_words(out),
            Derivation::Binary { left, right, .. } => {
                left.collect_words(out);
                right.collect_words(out);
            }
        }
    }
}
