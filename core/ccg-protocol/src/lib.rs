#![no_std] // The engine types stay usable without std

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod ids;
pub mod grammar;

// Re-export core types for convenience
pub use ids::{CatId, HeadId, TokenIndex};
pub use grammar::*;

pub mod model;
pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use rkyv::{from_bytes, to_bytes};

    #[test]
    fn test_slash_serialization() {
        let original = Slash::Backward;

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize Slash");
        let deserialized: Slash = from_bytes(&bytes).expect("Failed to deserialize Slash");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_id_layout() {
        assert_eq!(core::mem::size_of::<CatId>(), 4);
        assert_eq!(core::mem::size_of::<HeadId>(), 4);
        assert_eq!(u32::from(TokenIndex::new(7)), 7);
    }

    #[test]
    fn test_extraction_flags() {
        assert!(!Extraction::default().is_extracted());
        assert!(Extraction::default().is_bounded());
        assert!(Extraction::bounded().is_extracted());
        assert!(Extraction::bounded().is_bounded());
        assert!(!Extraction::unbounded().is_bounded());
        assert_eq!(Extraction::extracted(false), Extraction::unbounded());
    }

    #[test]
    fn test_report_archive() {
        let report = DependencyReport {
            version: 1,
            sentences: vec![SentenceDependencies {
                words: vec!["John".to_string(), "sleeps".to_string()],
                category: "S[dcl]".to_string(),
                dependencies: vec![DependencyTuple {
                    head_index: TokenIndex::new(1),
                    arg_index: TokenIndex::new(0),
                    head_category: "S[dcl]\\NP".to_string(),
                    slot: 1,
                    extracted: false,
                    bounded: true,
                }],
            }],
        };

        let bytes = to_bytes::<_, 1024>(&report).expect("Failed to serialize report");
        let archived = rkyv::check_archived_root::<DependencyReport>(&bytes[..])
            .expect("Archived report failed validation");

        assert_eq!(archived.sentences.len(), 1);
        assert_eq!(archived.sentences[0].dependencies[0].slot, 1);
        assert_eq!(archived.sentences[0].category.as_str(), "S[dcl]");
    }

    #[test]
    fn test_dep_rel_keeps_extraction() {
        let rel = DepRel {
            category: "(NP\\NP)/(S[dcl]\\NP)".to_string(),
            slot: 2,
            extraction: Extraction::unbounded(),
        };

        let bytes = to_bytes::<_, 256>(&rel).expect("Failed to serialize DepRel");
        let back: DepRel = from_bytes(&bytes).expect("Failed to deserialize DepRel");

        assert_eq!(back, rel);
    }
}
