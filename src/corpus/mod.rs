// Corpus module
//
// Verb, sentence and noun records loaded once at startup and shared
// read-only by every request.

mod loader;
mod types;

pub use loader::{load_corpus, parse_nouns, parse_sentences, parse_verbs, Row, Table};
pub use types::{NounRecord, SentenceRecord, VerbRecord, PERFECT_NOT_FOUND};

use serde::Serialize;

/// Immutable in-memory vocabulary data.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub verbs: Vec<VerbRecord>,
    pub sentences: Vec<SentenceRecord>,
    pub nouns: Vec<NounRecord>,
}

/// Record counts, reported by the health endpoint and `vocab-quiz check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub verbs: usize,
    pub sentences: usize,
    pub nouns: usize,
}

impl Corpus {
    /// Build a corpus, dropping records that could never be served.
    pub fn new(
        verbs: Vec<VerbRecord>,
        sentences: Vec<SentenceRecord>,
        nouns: Vec<NounRecord>,
    ) -> Self {
        Self {
            verbs: verbs.into_iter().filter(VerbRecord::is_usable).collect(),
            sentences: sentences
                .into_iter()
                .filter(SentenceRecord::is_eligible)
                .collect(),
            nouns: nouns
                .into_iter()
                .filter(|n| n.is_noun() && n.has_required_fields())
                .collect(),
        }
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats {
            verbs: self.verbs.len(),
            sentences: self.sentences.len(),
            nouns: self.nouns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty() && self.sentences.is_empty() && self.nouns.is_empty()
    }
}
