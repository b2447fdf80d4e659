use ccg_protocol::{HeadWord, TokenIndex};

/// Word returned by [`HeadWordList::word`] when a constituent has no head yet.
pub const NO_HEAD_WORD: &str = "WORD";

/// Ordered lexical heads of a constituent. Grows under coordination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadWordList {
    entries: Vec<HeadWord>,
}

impl HeadWordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(head: HeadWord) -> Self {
        Self { entries: vec![head] }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn first(&self) -> Option<&HeadWord> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeadWord> {
        self.entries.iter()
    }

    /// Word of the first head.
    pub fn word(&self) -> &str {
        self.first().map_or(NO_HEAD_WORD, |h| h.word.as_str())
    }

    pub fn indices(&self) -> Vec<TokenIndex> {
        self.entries.iter().map(|h| h.index).collect()
    }

    /// Appends copies of `other`'s heads; `other` is left as is.
    pub fn append(&mut self, other: &HeadWordList) {
        self.entries.extend(other.entries.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<Vec<HeadWord>> for HeadWordList {
    fn from(entries: Vec<HeadWord>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a HeadWordList {
    type Item = &'a HeadWord;
    type IntoIter = std::slice::Iter<'a, HeadWord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
