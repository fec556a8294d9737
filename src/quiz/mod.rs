// Quiz selection
//
// Turns the immutable corpus into per-request quiz payloads. All randomness
// flows through a single `Chooser` so tests can script exact picks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::corpus::{Corpus, NounRecord, VerbRecord};
use crate::matcher::{find_matching_sentences, MatchResult};

/// Source of uniform random indices.
pub trait Chooser: Send + Sync {
    /// Return an index in `0..len`. Callers never pass `len == 0`.
    fn choose_index(&self, len: usize) -> usize;
}

/// Thread-local RNG, for uncorrelated picks across concurrent requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngChooser;

impl Chooser for ThreadRngChooser {
    fn choose_index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Seeded RNG shared behind a mutex, for reproducible sessions.
pub struct SeededChooser {
    rng: Mutex<StdRng>,
}

impl SeededChooser {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Chooser for SeededChooser {
    fn choose_index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        lock(&self.rng).gen_range(0..len)
    }
}

/// Replays a fixed sequence of picks (each taken modulo `len`), cycling
/// when exhausted. An empty script always picks 0.
pub struct ScriptedChooser {
    picks: Mutex<VecDeque<usize>>,
}

impl ScriptedChooser {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: Mutex::new(picks.into_iter().collect()),
        }
    }
}

impl Chooser for ScriptedChooser {
    fn choose_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let mut picks = lock(&self.picks);
        match picks.pop_front() {
            Some(pick) => {
                picks.push_back(pick);
                pick % len
            }
            None => 0,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Seeded chooser when a seed is configured, thread RNG otherwise.
pub fn chooser_from_seed(seed: Option<u64>) -> Arc<dyn Chooser> {
    match seed {
        Some(seed) => {
            tracing::info!("Quiz selection seeded with {}", seed);
            Arc::new(SeededChooser::new(seed))
        }
        None => Arc::new(ThreadRngChooser),
    }
}

pub fn choose<'a, T>(chooser: &dyn Chooser, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(chooser.choose_index(items.len()))
}

/// Fisher-Yates shuffle driven by the chooser.
pub fn shuffle<T>(chooser: &dyn Chooser, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = chooser.choose_index(i + 1).min(i);
        items.swap(i, j);
    }
}

/// The blanked sentence presented alongside a verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSentence {
    pub english: String,
    pub german: String,
    pub blanked_sentence: String,
    pub correct_form: String,
    pub sentence_index: usize,
}

impl From<&MatchResult<'_>> for QuizSentence {
    fn from(result: &MatchResult<'_>) -> Self {
        Self {
            english: result.sentence.english.clone(),
            german: result.sentence.display_german().to_string(),
            blanked_sentence: result.blank_info.blanked_sentence.clone(),
            correct_form: result.blank_info.form.clone(),
            sentence_index: result.sentence_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerbQuestion {
    pub verb: VerbRecord,
    /// `None` when no stored sentence contains any form of the verb
    pub sentence: Option<QuizSentence>,
    pub has_perfect_form: bool,
}

/// Pick a verb, then one of the sentences that contain one of its forms.
///
/// Returns `None` only when the corpus has no verbs.
pub fn next_verb_question(corpus: &Corpus, chooser: &dyn Chooser) -> Option<VerbQuestion> {
    let verb = choose(chooser, &corpus.verbs)?;
    tracing::debug!("Selected verb: {} ({})", verb.meaning, verb.infinitive);

    let matches = find_matching_sentences(&verb.forms(), &corpus.sentences);
    let sentence = choose(chooser, &matches).map(QuizSentence::from);
    if sentence.is_none() {
        tracing::debug!("No matching sentences found for {}", verb.infinitive);
    }

    Some(VerbQuestion {
        verb: verb.clone(),
        sentence,
        has_perfect_form: verb.has_perfect_form(),
    })
}

/// A fresh shuffled copy of the nouns.
pub fn shuffled_nouns(corpus: &Corpus, chooser: &dyn Chooser) -> Vec<NounRecord> {
    let mut nouns = corpus.nouns.clone();
    shuffle(chooser, &mut nouns);
    nouns
}

/// Card for the sentence-ordering quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceCard {
    pub english: String,
    pub german: String,
}

/// Shuffled sentences with both an English and a German side.
pub fn shuffled_sentences(corpus: &Corpus, chooser: &dyn Chooser) -> Vec<SentenceCard> {
    let mut cards: Vec<SentenceCard> = corpus
        .sentences
        .iter()
        .filter(|s| !s.english.is_empty())
        .map(|s| SentenceCard {
            english: s.english.clone(),
            german: s.display_german().to_string(),
        })
        .collect();
    shuffle(chooser, &mut cards);
    cards
}
