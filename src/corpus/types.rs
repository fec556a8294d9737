// Corpus record types

use serde::{Deserialize, Serialize};

/// Marker the spreadsheet uses when no perfect participle was found.
pub const PERFECT_NOT_FOUND: &str = "verb not found";

/// A verb row from the `Verb` sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbRecord {
    pub meaning: String,
    pub infinitive: String,
    /// Perfect participle, empty when the sheet has none
    #[serde(default)]
    pub perfect: String,
    #[serde(default)]
    pub ich: String,
    #[serde(default)]
    pub du: String,
    #[serde(default)]
    pub er: String,
    #[serde(default)]
    pub sie: String,
    #[serde(default)]
    pub es: String,
    #[serde(default)]
    pub wir_sie: String,
    #[serde(default)]
    pub ihr: String,
}

impl VerbRecord {
    pub fn new(meaning: impl Into<String>, infinitive: impl Into<String>) -> Self {
        Self {
            meaning: meaning.into(),
            infinitive: infinitive.into(),
            ..Default::default()
        }
    }

    /// Set the perfect participle, normalising the "not found" marker to empty.
    pub fn with_perfect(mut self, perfect: impl Into<String>) -> Self {
        let perfect = perfect.into();
        self.perfect = if perfect.trim().eq_ignore_ascii_case(PERFECT_NOT_FOUND) {
            String::new()
        } else {
            perfect
        };
        self
    }

    /// Set the seven person forms in sheet order: ich, du, er, sie, es, wir/Sie, ihr.
    pub fn with_person_forms(mut self, forms: [&str; 7]) -> Self {
        let [ich, du, er, sie, es, wir_sie, ihr] = forms;
        self.ich = ich.to_string();
        self.du = du.to_string();
        self.er = er.to_string();
        self.sie = sie.to_string();
        self.es = es.to_string();
        self.wir_sie = wir_sie.to_string();
        self.ihr = ihr.to_string();
        self
    }

    /// The nine searchable forms, in declaration order.
    ///
    /// Order matters: the matcher breaks length ties by position in this array.
    pub fn forms(&self) -> [&str; 9] {
        [
            &self.infinitive,
            &self.perfect,
            &self.ich,
            &self.du,
            &self.er,
            &self.sie,
            &self.es,
            &self.wir_sie,
            &self.ihr,
        ]
    }

    /// Meaning and infinitive are both required for a verb to be quizzed.
    pub fn is_usable(&self) -> bool {
        !self.meaning.is_empty() && !self.infinitive.is_empty()
    }

    pub fn has_perfect_form(&self) -> bool {
        !self.perfect.trim().is_empty()
    }
}

/// An example sentence row from the `Sentences` sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub english: String,
    pub german: String,
    /// Optional second German rendering ("German example 2")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub german_alt: String,
}

impl SentenceRecord {
    pub fn new(english: impl Into<String>, german: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            german: german.into(),
            german_alt: String::new(),
        }
    }

    pub fn with_alt(mut self, german_alt: impl Into<String>) -> Self {
        self.german_alt = german_alt.into();
        self
    }

    /// Non-empty German texts, primary field first.
    pub fn german_texts(&self) -> impl Iterator<Item = &str> {
        [self.german.as_str(), self.german_alt.as_str()]
            .into_iter()
            .filter(|text| !text.is_empty())
    }

    /// A sentence with no German text can never be matched.
    pub fn is_eligible(&self) -> bool {
        self.german_texts().next().is_some()
    }

    /// Primary German text, or the alternate when the primary is empty.
    pub fn display_german(&self) -> &str {
        self.german_texts().next().unwrap_or("")
    }
}

/// A noun row from the `Noun` sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounRecord {
    pub singular: String,
    pub gender: String,
    pub article: String,
    pub full_word: String,
    pub plural: String,
    pub meaning: String,
    pub example: String,
}

impl NounRecord {
    /// Rows marked with gender `-` or lacking an article are adjectives/adverbs.
    pub fn is_noun(&self) -> bool {
        self.gender != "-" && !self.article.is_empty()
    }

    pub fn has_required_fields(&self) -> bool {
        [
            &self.singular,
            &self.gender,
            &self.article,
            &self.full_word,
            &self.meaning,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }
}
