//! Per-locale full-text search over page titles, headings and paragraphs.
//!
//! Each locale gets its own inverted index built with that locale's
//! tokenizer. There is no Uzbek tokenizer, so `uz` content is indexed with
//! the English one.

use std::collections::{BTreeMap, HashMap, HashSet};

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::Serialize;
use tracing::info;

use crate::i18n::Locale;
use crate::markdown;
use crate::source::{Page, Source};

/// Results returned for one query at most.
pub const MAX_RESULTS: usize = 20;

/// Word splitting and normalisation rules for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tokenizer {
    English,
    Russian,
}

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it", "of",
    "on", "or", "that", "the", "this", "to", "was", "with",
];

const RUSSIAN_STOPWORDS: &[&str] = &[
    "а", "без", "в", "во", "да", "для", "до", "же", "за", "и", "из", "или", "к", "как", "ли",
    "на", "не", "но", "о", "об", "от", "по", "при", "с", "со", "то", "у", "что", "это",
];

const ENGLISH_SUFFIXES: &[&str] = &["ing", "ed", "es", "s"];

const RUSSIAN_SUFFIXES: &[&str] = &[
    "ями", "ами", "ого", "его", "ому", "ему", "ыми", "ими", "ах", "ях", "ов", "ев", "ой", "ей",
    "ий", "ый", "ая", "яя", "ое", "ее", "ые", "ие", "ом", "ем", "ам", "ям", "ую", "юю", "а", "я",
    "ы", "и", "е", "о", "у", "ю",
];

impl Tokenizer {
    /// Index terms of `text`, in order, stopwords removed.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| self.normalize(word))
            .filter(|word| !self.is_stopword(word))
            .map(|word| self.stem(word))
            .collect()
    }

    fn normalize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        match self {
            Tokenizer::English => lower,
            Tokenizer::Russian => lower.replace('ё', "е"),
        }
    }

    fn is_stopword(&self, word: &str) -> bool {
        match self {
            Tokenizer::English => ENGLISH_STOPWORDS.contains(&word),
            Tokenizer::Russian => RUSSIAN_STOPWORDS.contains(&word),
        }
    }

    /// Strip one inflectional suffix, keeping a stem of at least three
    /// characters.
    fn stem(&self, word: String) -> String {
        let suffixes = match self {
            Tokenizer::English => ENGLISH_SUFFIXES,
            Tokenizer::Russian => RUSSIAN_SUFFIXES,
        };
        for suffix in suffixes {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.chars().count() >= 3 {
                    return stem.to_string();
                }
            }
        }
        word
    }
}

/// Tokenizer used for a locale's content.
pub fn tokenizer_for(locale: Locale) -> Tokenizer {
    match locale {
        Locale::En => Tokenizer::English,
        Locale::Ru => Tokenizer::Russian,
        Locale::Uz => Tokenizer::English,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Page,
    Heading,
    Text,
}

/// One search hit as returned to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResultType,
    pub content: String,
}

/// Inverted index for one locale.
#[derive(Debug)]
pub struct LocaleIndex {
    tokenizer: Tokenizer,
    documents: Vec<SearchResult>,
    terms: BTreeMap<String, Vec<usize>>,
}

impl LocaleIndex {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            documents: Vec::new(),
            terms: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn add(&mut self, document: SearchResult) {
        let idx = self.documents.len();
        let terms: HashSet<String> = self.tokenizer.tokenize(&document.content).into_iter().collect();
        for term in terms {
            self.terms.entry(term).or_default().push(idx);
        }
        self.documents.push(document);
    }

    /// Index a page: its title, each heading and each paragraph.
    pub fn add_page(&mut self, url: &str, page: &Page) {
        self.add(SearchResult {
            id: url.to_string(),
            url: url.to_string(),
            kind: ResultType::Page,
            content: page.title.clone(),
        });

        let toc = markdown::render(&page.body).toc;
        let mut headings = toc.iter();
        let mut current_anchor = String::new();
        let mut buffer = String::new();
        let mut in_heading = false;
        let mut text_count = 0;

        for event in Parser::new(&page.body) {
            match event {
                Event::Start(Tag::Heading { .. }) => {
                    in_heading = true;
                    buffer.clear();
                }
                Event::End(TagEnd::Heading(_)) => {
                    in_heading = false;
                    if let Some(entry) = headings.next() {
                        current_anchor = entry.id.clone();
                        self.add(SearchResult {
                            id: format!("{}#{}", url, entry.id),
                            url: format!("{}#{}", url, entry.id),
                            kind: ResultType::Heading,
                            content: entry.title.clone(),
                        });
                    }
                    buffer.clear();
                }
                Event::Start(Tag::Paragraph) | Event::Start(Tag::Item) | Event::Start(Tag::CodeBlock(_)) => {
                    buffer.clear();
                }
                Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) | Event::End(TagEnd::CodeBlock) => {
                    let content = buffer.trim();
                    if !content.is_empty() && !in_heading {
                        let target = if current_anchor.is_empty() {
                            url.to_string()
                        } else {
                            format!("{}#{}", url, current_anchor)
                        };
                        self.add(SearchResult {
                            id: format!("{}-{}", url, text_count),
                            url: target,
                            kind: ResultType::Text,
                            content: content.to_string(),
                        });
                        text_count += 1;
                    }
                    buffer.clear();
                }
                Event::Text(text) | Event::Code(text) => buffer.push_str(&text),
                Event::SoftBreak | Event::HardBreak => buffer.push(' '),
                _ => {}
            }
        }
    }

    /// Documents matching every query term; the last term also matches as a
    /// prefix so partially typed words find results.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let terms = self.tokenizer.tokenize(query);
        let Some((last, rest)) = terms.split_last() else {
            return Vec::new();
        };

        let mut candidates: Option<HashSet<usize>> = None;
        for term in rest {
            let docs: HashSet<usize> = self.terms.get(term).into_iter().flatten().copied().collect();
            candidates = Some(intersect(candidates, docs));
        }

        let mut prefix_docs = HashSet::new();
        for (term, docs) in self.terms.range(last.clone()..) {
            if !term.starts_with(last.as_str()) {
                break;
            }
            prefix_docs.extend(docs.iter().copied());
        }
        let mut hits: Vec<usize> = intersect(candidates, prefix_docs).into_iter().collect();

        hits.sort_by_key(|&idx| (self.documents[idx].kind, idx));
        hits.into_iter()
            .take(MAX_RESULTS)
            .map(|idx| self.documents[idx].clone())
            .collect()
    }
}

fn intersect(current: Option<HashSet<usize>>, docs: HashSet<usize>) -> HashSet<usize> {
    match current {
        Some(current) => current.intersection(&docs).copied().collect(),
        None => docs,
    }
}

/// Search indexes for every locale.
#[derive(Debug)]
pub struct SearchIndex {
    locales: HashMap<Locale, LocaleIndex>,
}

impl SearchIndex {
    /// Index every page each locale serves, fallback pages included.
    pub fn build(source: &Source) -> Self {
        let mut locales = HashMap::new();
        for locale in Locale::ALL {
            let mut index = LocaleIndex::new(tokenizer_for(locale));
            for page in source.pages(locale) {
                index.add_page(&page.url(locale), page);
            }
            info!("Indexed {} search entries for {}", index.len(), locale);
            locales.insert(locale, index);
        }
        Self { locales }
    }

    pub fn search(&self, locale: Locale, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.locales
            .get(&locale)
            .map(|index| index.search(query))
            .unwrap_or_default()
    }
}
