// verbformen.de word lookup
//
// Fetches the grammar page for a word and extracts the noun article,
// English translation, example sentences and declension image.

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use super::ExampleSentence;
use crate::config::constants::HTTP_TIMEOUT_SECS;

static IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https://www\.verbformen\.de/deklination/substantive/[^"]+\.png"#)
        .expect("image URL pattern is valid")
});

static NOMINATIVE_HEADER: Lazy<Selector> = Lazy::new(|| selector(r#"th[title="Nominativ"]"#));
static TABLE_CELL: Lazy<Selector> = Lazy::new(|| selector("td"));
static ENGLISH_SPAN: Lazy<Selector> = Lazy::new(|| selector(r#"span[lang="en"]"#));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h2"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
static LINE_BREAK: Lazy<Selector> = Lazy::new(|| selector("br"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Response of `/api/lookup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordLookup {
    pub word: String,
    /// Kept for the frontend; PONS data is served by its own endpoint
    pub pons: Map<String, Value>,
    pub verbformen_html: String,
    pub verb_image_url: String,
    pub translation: String,
    pub beispiele_list: Vec<ExampleSentence>,
    pub article: String,
}

pub struct GrammarSiteClient {
    client: Client,
    base_url: Url,
}

impl GrammarSiteClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid grammar site URL: {}", base_url))?;

        Ok(Self { client, base_url })
    }

    /// `<base>/?w=<word>`
    pub fn page_url(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/");
        url.query_pairs_mut().clear().append_pair("w", word);
        url
    }

    pub async fn lookup(&self, word: &str) -> Result<WordLookup> {
        let url = self.page_url(word);
        tracing::debug!("Fetching grammar page {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context("Failed to reach grammar site")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Grammar site returned {}", status);
        }

        let html = response
            .text()
            .await
            .context("Failed to read grammar page")?;

        Ok(parse_lookup(word, &url, &html, &self.base_url))
    }
}

/// Extract everything the lookup endpoint returns from a fetched page.
pub fn parse_lookup(word: &str, page_url: &Url, html: &str, base_url: &Url) -> WordLookup {
    let document = Html::parse_document(html);

    let translation = extract_translation(&document);
    let beispiele_list = if translation.is_empty() {
        Vec::new()
    } else {
        extract_examples(&document)
    };

    let verb_image_url = IMAGE_URL
        .find(html)
        .map(|m| m.as_str().to_string())
        .or_else(|| default_image_url(base_url, word).ok().map(String::from))
        .unwrap_or_default();

    WordLookup {
        word: word.to_string(),
        pons: Map::new(),
        verbformen_html: format!(r#"<a href="{0}">{0}</a>"#, page_url),
        verb_image_url,
        translation,
        beispiele_list,
        article: extract_article(&document),
    }
}

fn default_image_url(base_url: &Url, word: &str) -> Result<Url> {
    let mut url = base_url.clone();
    url.set_query(None);
    let file = format!("{}.png", word);
    url.path_segments_mut()
        .map_err(|_| anyhow!("grammar site URL cannot have a path"))?
        .clear()
        .extend(["deklination", "substantive", file.as_str()]);
    Ok(url)
}

/// First cell of the table row headed "Nominativ".
fn extract_article(document: &Html) -> String {
    let Some(header) = document.select(&NOMINATIVE_HEADER).next() else {
        return String::new();
    };

    let row = header
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "tr");

    row.map(|row| row.select(&TABLE_CELL).collect::<Vec<_>>())
        .filter(|cells| cells.len() >= 2)
        .map(|cells| stripped_text(&cells[0]))
        .unwrap_or_default()
}

/// Text nodes of the first `span[lang=en]` joined by ", ", empty pieces dropped.
fn extract_translation(document: &Html) -> String {
    let Some(span) = document.select(&ENGLISH_SPAN).next() else {
        return String::new();
    };

    let joined = span.text().collect::<Vec<_>>().join(", ");
    joined
        .trim()
        .split(", ")
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Items of the first list after the "Beispiele" heading.
fn extract_examples(document: &Html) -> Vec<ExampleSentence> {
    let Some(heading) = document
        .select(&HEADING)
        .find(|h| stripped_text(h) == "Beispiele")
    else {
        tracing::debug!("No 'Beispiele' section found");
        return Vec::new();
    };

    let Some(list) = next_element_named(document, &heading, "ul") else {
        tracing::debug!("No <ul> with examples found");
        return Vec::new();
    };

    list.select(&LIST_ITEM)
        .map(|item| ExampleSentence {
            de: german_part(&item),
            en: english_part(document, &item),
        })
        .collect()
}

/// Inner HTML of a list item up to its first `<br>`.
fn german_part(item: &ElementRef) -> String {
    let mut html = String::new();
    for child in item.children() {
        match child.value() {
            Node::Element(el) if el.name() == "br" => break,
            Node::Text(text) => html.push_str(text),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    html.push_str(&el.html());
                }
            }
            _ => {}
        }
    }
    html.trim().to_string()
}

/// Text of the first `<span>` following the item's `<br>`.
fn english_part(document: &Html, item: &ElementRef) -> String {
    let Some(br) = item.select(&LINE_BREAK).next() else {
        return String::new();
    };
    if br.next_sibling().is_none() {
        return String::new();
    }

    next_element_named(document, &br, "span")
        .map(|span| stripped_text(&span))
        .unwrap_or_default()
}

/// First element called `name` after `after`, in document order.
fn next_element_named<'a>(
    document: &'a Html,
    after: &ElementRef<'_>,
    name: &str,
) -> Option<ElementRef<'a>> {
    let after = after.id();
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != after)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name)
}

fn stripped_text(element: &ElementRef) -> String {
    element.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
  <table>
    <tr><th title="Nominativ">Nom.</th><td> das </td><td>Haus</td></tr>
  </table>
  <p><span lang="en"><b>house</b>, <i>home</i></span></p>
  <h2>Beispiele</h2>
  <div>
    <ul>
      <li>Das <b>Haus</b> ist alt.<br><span>The house is old.</span></li>
      <li>Wir bauen ein Haus.</li>
    </ul>
  </div>
  <img src="https://www.verbformen.de/deklination/substantive/Haus_1.png">
</body></html>
"#;

    fn urls() -> (Url, Url) {
        let base = Url::parse("https://www.verbformen.de").unwrap();
        let page = Url::parse("https://www.verbformen.de/?w=Haus").unwrap();
        (base, page)
    }

    #[test]
    fn test_parse_full_page() {
        let (base, page) = urls();
        let lookup = parse_lookup("Haus", &page, PAGE, &base);

        assert_eq!(lookup.article, "das");
        assert_eq!(lookup.translation, "house, home");
        assert_eq!(
            lookup.verb_image_url,
            "https://www.verbformen.de/deklination/substantive/Haus_1.png"
        );
        assert_eq!(lookup.beispiele_list.len(), 2);
        assert_eq!(lookup.beispiele_list[0].de, "Das <b>Haus</b> ist alt.");
        assert_eq!(lookup.beispiele_list[0].en, "The house is old.");
        assert_eq!(lookup.beispiele_list[1].de, "Wir bauen ein Haus.");
        assert_eq!(lookup.beispiele_list[1].en, "");
        assert!(lookup.verbformen_html.contains(r#"href="https://www.verbformen.de/?w=Haus""#));
    }

    #[test]
    fn test_examples_need_a_translation() {
        let (base, page) = urls();
        let html = r#"<h2>Beispiele</h2><ul><li>Ein Satz.</li></ul>"#;
        let lookup = parse_lookup("Satz", &page, html, &base);

        assert!(lookup.translation.is_empty());
        assert!(lookup.beispiele_list.is_empty());
        assert!(lookup.article.is_empty());
    }

    #[test]
    fn test_default_image_url_is_percent_encoded() {
        let (base, page) = urls();
        let lookup = parse_lookup("Bär", &page, "<html></html>", &base);

        assert_eq!(
            lookup.verb_image_url,
            "https://www.verbformen.de/deklination/substantive/B%C3%A4r.png"
        );
    }

    #[test]
    fn test_translation_separators_do_not_leave_empty_pieces() {
        let html = r#"<span lang="en"><b>to go</b>, <i>to walk</i></span>"#;
        assert_eq!(extract_translation(&Html::parse_document(html)), "to go, to walk");

        let single = r#"<span lang="en"> house </span>"#;
        assert_eq!(extract_translation(&Html::parse_document(single)), "house");
    }

    #[test]
    fn test_page_url_encodes_query() {
        let client = GrammarSiteClient::new("https://www.verbformen.de").unwrap();
        assert_eq!(
            client.page_url("Bär").as_str(),
            "https://www.verbformen.de/?w=B%C3%A4r"
        );
    }
}
