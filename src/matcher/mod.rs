// Sentence matcher
//
// Given a verb's inflected forms and the sentence corpus, finds which
// sentences contain a form and renders a fill-in-the-blank version of each.
// Pure and synchronous: safe to call from any number of requests at once.

use serde::Serialize;
use std::cmp::Ordering;

use crate::config::constants::BLANK_MARKER;
use crate::corpus::SentenceRecord;

/// The form found in one sentence and its blanked rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// Matched form, in its original casing
    pub form: String,
    /// Lowercased text with the first occurrence of the form blanked out
    pub blanked_sentence: String,
    /// Lowercased text the form was found in
    pub original_sentence: String,
}

/// A sentence that contains one of the verb's forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult<'a> {
    /// Position of the sentence in the input slice
    pub sentence_index: usize,
    pub sentence: &'a SentenceRecord,
    pub blank_info: MatchOutcome,
}

/// Find the most specific form that occurs in `sentence`.
///
/// Forms are tried longest first so that a bare stem never wins over a
/// conjugated form that contains it. Within one form the primary German
/// text is tried before the alternate. Empty forms are ignored.
pub fn find_form_in_sentence<S: AsRef<str>>(
    sentence: &SentenceRecord,
    forms: &[S],
) -> Option<MatchOutcome> {
    let texts: Vec<String> = sentence.german_texts().map(str::to_lowercase).collect();
    if texts.is_empty() {
        return None;
    }

    for form in ordered_forms(forms) {
        let needle = form.to_lowercase();
        for text in &texts {
            if let Some(blanked) = blank_first(text, &needle) {
                return Some(MatchOutcome {
                    form: form.to_string(),
                    blanked_sentence: blanked,
                    original_sentence: text.clone(),
                });
            }
        }
    }

    None
}

/// Match every sentence against the forms, keeping input order.
///
/// An empty result is a normal outcome: the caller presents the verb
/// without an example sentence.
pub fn find_matching_sentences<'a, S: AsRef<str>>(
    forms: &[S],
    sentences: &'a [SentenceRecord],
) -> Vec<MatchResult<'a>> {
    let matches: Vec<MatchResult<'a>> = sentences
        .iter()
        .enumerate()
        .filter_map(|(sentence_index, sentence)| {
            find_form_in_sentence(sentence, forms).map(|blank_info| MatchResult {
                sentence_index,
                sentence,
                blank_info,
            })
        })
        .collect();

    tracing::debug!(
        forms = forms.len(),
        sentences = sentences.len(),
        "Found {} matching sentences",
        matches.len()
    );
    matches
}

/// Non-blank forms sorted by character length descending, then by position.
fn ordered_forms<S: AsRef<str>>(forms: &[S]) -> Vec<&str> {
    let mut candidates: Vec<(usize, &str)> = forms
        .iter()
        .map(|form| form.as_ref())
        .enumerate()
        .filter(|(_, form)| !form.trim().is_empty())
        .collect();

    candidates.sort_by(|a, b| longest_first(*a, *b));
    candidates.into_iter().map(|(_, form)| form).collect()
}

fn longest_first(a: (usize, &str), b: (usize, &str)) -> Ordering {
    b.1.chars()
        .count()
        .cmp(&a.1.chars().count())
        .then(a.0.cmp(&b.0))
}

fn blank_first(text: &str, needle: &str) -> Option<String> {
    let start = text.find(needle)?;
    let end = start + needle.len();
    Some(format!("{}{}{}", &text[..start], BLANK_MARKER, &text[end..]))
}
