// Dictionary lookups
//
// Two sources: the verbformen.de grammar pages (scraped HTML) and the
// PONS dictionary API, whose responses are cached in SQLite.

mod cache;
mod pons;
mod verbformen;

pub use cache::{CachedEntry, PonsCache};
pub use pons::{parse_pons_response, PonsClient, PonsLookup, PonsResponse, PonsTranslation};
pub use verbformen::{parse_lookup, GrammarSiteClient, WordLookup};

use serde::{Deserialize, Serialize};

/// A German example sentence with its English translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub de: String,
    pub en: String,
}
