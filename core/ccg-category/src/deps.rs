use ccg_protocol::{DepRel, DependencyTuple, Extraction, HeadWord, Slash, TokenIndex};

use crate::heads::HeadWordList;

/// Kind of a word-word relation. Only argument relations are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Arg,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Arg => "arg",
        }
    }
}

/// One dependency. A template has no argument yet; instantiating it against
/// a head list fills the argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub relation: Relation,
    pub head: Option<HeadWord>,
    pub argument: Option<HeadWord>,
    /// Argument slot of the head's category, counted from 1.
    pub slot: u32,
    pub direction: Slash,
    pub extraction: Extraction,
}

impl Dependency {
    pub fn template(head: Option<&HeadWord>, slot: u32, direction: Slash) -> Self {
        Self {
            relation: Relation::Arg,
            head: head.cloned(),
            argument: None,
            slot,
            direction,
            extraction: Extraction::empty(),
        }
    }

    pub fn is_filled(&self) -> bool {
        self.head.is_some() && self.argument.is_some()
    }

    pub fn is_local(&self) -> bool {
        !self.extraction.is_extracted()
    }

    pub fn is_bounded(&self) -> bool {
        self.extraction.is_bounded()
    }

    /// Extracted and realized to the left of the head.
    pub fn is_backward_extracted(&self) -> bool {
        self.extraction.is_extracted() && self.direction == Slash::Backward
    }

    pub fn involves(&self, index: TokenIndex) -> bool {
        let at = |w: &Option<HeadWord>| w.as_ref().map_or(false, |w| w.index == index);
        at(&self.head) || at(&self.argument)
    }

    pub fn relation_label(&self) -> Option<DepRel> {
        let head = self.head.as_ref()?;
        Some(DepRel {
            category: head.category.clone(),
            slot: self.slot,
            extraction: self.extraction,
        })
    }

    pub fn to_tuple(&self) -> Option<DependencyTuple> {
        let head = self.head.as_ref()?;
        let argument = self.argument.as_ref()?;
        Some(DependencyTuple {
            head_index: head.index,
            arg_index: argument.index,
            head_category: head.category.clone(),
            slot: self.slot,
            extracted: self.extraction.is_extracted(),
            bounded: self.extraction.is_bounded(),
        })
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn word(w: &Option<HeadWord>) -> &str {
            w.as_ref().map_or("_", |w| w.word.as_str())
        }
        write!(
            f,
            "{}({}, {}, {})",
            self.relation.as_str(),
            word(&self.head),
            self.slot,
            word(&self.argument)
        )?;
        if self.extraction.is_extracted() {
            f.write_str(if self.is_bounded() { ":B" } else { ":U" })?;
        }
        Ok(())
    }
}

/// Ordered dependency entries with value semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    entries: Vec<Dependency>,
}

impl DependencyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.entries.iter()
    }

    pub fn push(&mut self, dep: Dependency) {
        self.entries.push(dep);
    }

    pub fn append(&mut self, other: &DependencyList) {
        self.entries.extend(other.entries.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Marks every entry extracted. `bounded == false` also makes it
    /// unbounded; `bounded == true` leaves the boundedness bit alone.
    pub fn mark_extracted(&mut self, bounded: bool) {
        for dep in &mut self.entries {
            dep.extraction |= Extraction::EXTRACTED;
            if !bounded {
                dep.extraction |= Extraction::UNBOUNDED;
            }
        }
    }

    pub fn mark_unbounded(&mut self) {
        self.mark_extracted(false);
    }

    /// Rewrites the head category of every entry that has a head.
    pub fn set_head_category(&mut self, category: &str) {
        for head in self.entries.iter_mut().filter_map(|d| d.head.as_mut()) {
            head.category = category.to_owned();
        }
    }

    pub fn contains_index(&self, index: TokenIndex) -> bool {
        self.entries.iter().any(|d| d.involves(index))
    }

    /// Entries still missing their head or their argument.
    pub fn unfilled(&self) -> DependencyList {
        self.entries.iter().filter(|d| !d.is_filled()).cloned().collect()
    }

    /// One filled copy of every template per head, head-major.
    pub fn instantiate(&self, heads: &HeadWordList) -> DependencyList {
        heads
            .iter()
            .flat_map(|head| {
                self.entries.iter().map(move |template| Dependency {
                    argument: Some(head.clone()),
                    ..template.clone()
                })
            })
            .collect()
    }

    pub fn tuples(&self) -> Vec<DependencyTuple> {
        self.entries.iter().filter_map(Dependency::to_tuple).collect()
    }
}

impl FromIterator<Dependency> for DependencyList {
    fn from_iter<I: IntoIterator<Item = Dependency>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Dependency>> for DependencyList {
    fn from(entries: Vec<Dependency>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a DependencyList {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str, cat: &str, index: u32) -> HeadWord {
        HeadWord::new(w, cat, TokenIndex::new(index))
    }

    #[test]
    fn test_instantiate_is_head_major() {
        let likes = word("likes", "(S[dcl]\\NP)/NP", 1);
        let templates: DependencyList = vec![
            Dependency::template(Some(&likes), 1, Slash::Backward),
            Dependency::template(Some(&likes), 2, Slash::Forward),
        ]
        .into();
        let mut heads = HeadWordList::single(word("Mary", "NP", 2));
        heads.append(&HeadWordList::single(word("Sue", "NP", 4)));

        let filled = templates.instantiate(&heads);

        let got: Vec<(u32, &str)> = filled
            .iter()
            .map(|d| (d.slot, d.argument.as_ref().unwrap().word.as_str()))
            .collect();
        assert_eq!(got, vec![(1, "Mary"), (2, "Mary"), (1, "Sue"), (2, "Sue")]);
        assert!(templates.iter().all(|d| d.argument.is_none()));
    }

    #[test]
    fn test_unfilled_keeps_templates_only() {
        let head = word("eats", "S[dcl]\\NP", 1);
        let template = Dependency::template(Some(&head), 1, Slash::Backward);
        let filled = Dependency {
            argument: Some(word("John", "NP", 0)),
            ..template.clone()
        };
        let list: DependencyList = vec![template.clone(), filled].into();

        assert_eq!(list.unfilled(), DependencyList::from(vec![template]));
        assert_eq!(list.tuples().len(), 1);
        assert!(list.contains_index(TokenIndex::new(0)));
        assert!(!list.contains_index(TokenIndex::new(5)));
    }

    #[test]
    fn test_bounded_marking_keeps_unbounded_bit() {
        let head = word("who", "(NP\\NP)/(S[dcl]\\NP)", 1);
        let mut list: DependencyList = vec![Dependency::template(Some(&head), 1, Slash::Forward)].into();

        list.mark_unbounded();
        list.mark_extracted(true);

        let dep = list.iter().next().unwrap();
        assert!(!dep.is_local());
        assert!(!dep.is_bounded());
        assert!(!dep.is_backward_extracted());
    }

    #[test]
    fn test_display_shows_extraction() {
        let head = word("that", "(NP\\NP)/(S[dcl]/NP)", 1);
        let mut dep = Dependency::template(Some(&head), 2, Slash::Forward);
        dep.argument = Some(word("book", "N", 0));
        dep.extraction = Extraction::unbounded();

        assert_eq!(dep.to_string(), "arg(that, 2, book):U");
    }
}
