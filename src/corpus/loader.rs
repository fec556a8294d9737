// Spreadsheet corpus loader
//
// Reads the Verb, Sentences and Noun sheets of the vocabulary workbook.
// Every failure degrades to an empty section: a broken workbook must never
// take the server down.

use anyhow::{anyhow, bail, Result};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::types::{NounRecord, SentenceRecord, VerbRecord};
use super::Corpus;

pub const VERB_SHEET: &str = "Verb";
pub const SENTENCE_SHEET: &str = "Sentences";
pub const NOUN_SHEET: &str = "Noun";

/// The Verb sheet carries a title row above its header row.
const VERB_HEADER_ROW: usize = 1;
const DEFAULT_HEADER_ROW: usize = 0;

const DEFAULT_PLURAL: &str = "N/A";
const DEFAULT_EXAMPLE: &str = "No example available";

/// A sheet reduced to trimmed string cells, addressed by header name.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        Self { headers, rows }
    }

    /// Build a table from raw rows, taking `header_row` as the header line.
    pub fn from_rows(mut rows: Vec<Vec<String>>, header_row: usize) -> Result<Self> {
        if rows.len() <= header_row {
            bail!("sheet has no header row at line {}", header_row + 1);
        }
        let body = rows.split_off(header_row + 1);
        let headers = rows.pop().unwrap_or_default();
        Ok(Self::new(headers, body))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.headers.iter().position(|h| h == name))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row { table: self, cells })
    }
}

pub struct Row<'a> {
    table: &'a Table,
    cells: &'a [String],
}

impl Row<'_> {
    /// Cell under the first header in `names` that exists; empty when absent.
    pub fn get(&self, names: &[&str]) -> String {
        self.table
            .column(names)
            .and_then(|idx| self.cells.get(idx))
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default()
    }
}

/// Load the full corpus from a workbook. Never fails.
pub fn load_corpus(path: &Path) -> Corpus {
    if !path.exists() {
        tracing::warn!("Workbook not found at {}, starting with an empty corpus", path.display());
        return Corpus::default();
    }

    let mut workbook = match open_workbook_auto(path) {
        Ok(workbook) => workbook,
        Err(e) => {
            tracing::warn!("Failed to open workbook {}: {}", path.display(), e);
            return Corpus::default();
        }
    };

    let verbs = read_section(&mut workbook, VERB_SHEET, VERB_HEADER_ROW, parse_verbs);
    let sentences = read_section(&mut workbook, SENTENCE_SHEET, DEFAULT_HEADER_ROW, parse_sentences);
    let nouns = read_section(&mut workbook, NOUN_SHEET, DEFAULT_HEADER_ROW, parse_nouns);

    let corpus = Corpus::new(verbs, sentences, nouns);
    tracing::info!(
        verbs = corpus.verbs.len(),
        sentences = corpus.sentences.len(),
        nouns = corpus.nouns.len(),
        "Loaded corpus from {}",
        path.display()
    );
    corpus
}

fn read_section<T>(
    workbook: &mut Sheets<BufReader<File>>,
    sheet: &str,
    header_row: usize,
    parse: fn(&Table) -> Vec<T>,
) -> Vec<T> {
    match read_table(workbook, sheet, header_row) {
        Ok(table) => {
            tracing::debug!("Sheet {} columns: {:?}", sheet, table.headers());
            parse(&table)
        }
        Err(e) => {
            tracing::warn!("Skipping sheet {}: {}", sheet, e);
            Vec::new()
        }
    }
}

fn read_table(
    workbook: &mut Sheets<BufReader<File>>,
    sheet: &str,
    header_row: usize,
) -> Result<Table> {
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| anyhow!("cannot read sheet '{}': {}", sheet, e))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Table::from_rows(rows, header_row)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

pub fn parse_verbs(table: &Table) -> Vec<VerbRecord> {
    let verbs: Vec<VerbRecord> = table
        .rows()
        .map(|row| {
            VerbRecord::new(row.get(&["Meaning"]), row.get(&["Infinity", "Infinitive"]))
                .with_perfect(row.get(&["PP"]))
                .with_person_forms([
                    row.get(&["ich"]).as_str(),
                    row.get(&["du"]).as_str(),
                    row.get(&["er"]).as_str(),
                    row.get(&["sie"]).as_str(),
                    row.get(&["es"]).as_str(),
                    row.get(&["wir/Sie"]).as_str(),
                    row.get(&["ihr"]).as_str(),
                ])
        })
        .filter(VerbRecord::is_usable)
        .collect();

    tracing::debug!("Parsed {} of {} verb rows", verbs.len(), table.len());
    verbs
}

pub fn parse_sentences(table: &Table) -> Vec<SentenceRecord> {
    table
        .rows()
        .map(|row| {
            SentenceRecord::new(row.get(&["English"]), row.get(&["German"]))
                .with_alt(row.get(&["German example 2"]))
        })
        .filter(SentenceRecord::is_eligible)
        .collect()
}

pub fn parse_nouns(table: &Table) -> Vec<NounRecord> {
    let mut nouns = Vec::new();

    for (index, row) in table.rows().enumerate() {
        let plural = row.get(&["Plural"]);
        let example = row.get(&["Example"]);
        let noun = NounRecord {
            singular: row.get(&["Noun (singular)"]),
            gender: row.get(&["Gender"]),
            article: row.get(&["Article"]),
            full_word: row.get(&["Full word"]),
            plural: if plural.is_empty() { DEFAULT_PLURAL.to_string() } else { plural },
            // The workbook header is misspelt; accept both
            meaning: row.get(&["Meanning", "Meaning"]),
            example: if example.is_empty() { DEFAULT_EXAMPLE.to_string() } else { example },
        };

        if !noun.is_noun() {
            tracing::debug!("Skipping row {} as it's not a noun: {}", index, noun.singular);
            continue;
        }
        if !noun.has_required_fields() {
            tracing::debug!("Skipping row {} due to missing required fields", index);
            continue;
        }
        nouns.push(noun);
    }

    nouns
}
