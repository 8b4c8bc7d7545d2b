use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

use crate::dates::format_iso;
use crate::stats::day_of;
use crate::types::{KanbanBoard, KanbanCard, Priority};

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub use_regex: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueFilter {
    Any,
    Overdue,
    Today,
    Week,
    Future,
}

/// Derived card facts the query terms match against.
#[derive(Debug, Clone)]
pub struct SearchCardMeta {
    pub hash_tags: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub is_overdue: bool,
}

impl SearchCardMeta {
    /// Tags come from the tag set, label names, and inline `#tags` in the
    /// title or description.
    pub fn from_card(card: &KanbanCard, today: NaiveDate) -> Self {
        let mut hash_tags: Vec<String> = Vec::new();
        let explicit = card
            .tags
            .iter()
            .map(String::as_str)
            .chain(card.labels.iter().map(|l| l.name.as_str()))
            .filter(|t| !t.trim().is_empty())
            .map(normalize_hash_tag);
        let inline = extract_hash_tags(&card.title)
            .into_iter()
            .chain(extract_hash_tags(card.description.as_deref().unwrap_or("")));
        for tag in explicit.chain(inline) {
            if !hash_tags.contains(&tag) {
                hash_tags.push(tag);
            }
        }

        let due_date = card.due_date.as_ref().map(day_of);
        let is_overdue = due_date.map(|d| d < today && !card.completed).unwrap_or(false);
        Self {
            hash_tags,
            due_date,
            is_overdue,
        }
    }
}

pub struct SearchDocument<'a> {
    pub board_title: &'a str,
    pub list_title: &'a str,
    pub card: &'a KanbanCard,
    pub meta: &'a SearchCardMeta,
}

impl SearchDocument<'_> {
    fn text(&self) -> String {
        match &self.card.description {
            Some(description) => format!("{}\n{}", self.card.title, description),
            None => self.card.title.clone(),
        }
    }
}

#[derive(Debug)]
enum SearchTerm {
    Text(String),
    Tag(String),
    Board(String),
    List(String),
    IsCompleted(bool),
    Priority(Priority),
    Due(DueFilter),
    DueDate(NaiveDate),
    Regex(Regex),
}

#[derive(Debug)]
struct ParsedTerm {
    negate: bool,
    term: SearchTerm,
}

/// Compiled card query.
///
/// Tokens are ANDed; a leading `-` negates a token. Recognized forms:
/// `#tag`, `tag:x`, `is:open|done`, `priority:high`, `board:x`, `list:x`,
/// `due:any|overdue|today|week|future|YYYY-MM-DD`, `/regex/`, plain text.
pub struct SearchEngine {
    terms: Vec<ParsedTerm>,
    regex_mode: Option<Regex>,
    regex_invalid: bool,
    case_sensitive: bool,
    today: NaiveDate,
    week_start: NaiveDate,
    week_end: NaiveDate,
}

impl SearchEngine {
    pub fn compile(raw_query: &str, options: SearchOptions, today: NaiveDate) -> Self {
        let query = raw_query.trim();
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let week_end = week_start + Duration::days(6);

        let mut engine = Self {
            terms: Vec::new(),
            regex_mode: None,
            regex_invalid: false,
            case_sensitive: options.case_sensitive,
            today,
            week_start,
            week_end,
        };

        if query.is_empty() {
            return engine;
        }

        if options.use_regex {
            match Regex::new(query) {
                Ok(regex) => engine.regex_mode = Some(regex),
                Err(_) => engine.regex_invalid = true,
            }
            return engine;
        }

        engine.terms = split_query_tokens(query)
            .into_iter()
            .filter_map(|token| parse_token(token, options.case_sensitive))
            .collect();
        engine
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.regex_mode.is_none() && !self.regex_invalid
    }

    pub fn matches(&self, doc: &SearchDocument<'_>) -> bool {
        if self.regex_invalid {
            return false;
        }

        if let Some(regex) = &self.regex_mode {
            return regex.is_match(&doc.text());
        }

        for parsed in &self.terms {
            let matched = self.matches_term(&parsed.term, doc);
            if parsed.negate {
                if matched {
                    return false;
                }
            } else if !matched {
                return false;
            }
        }
        true
    }

    fn matches_term(&self, term: &SearchTerm, doc: &SearchDocument<'_>) -> bool {
        match term {
            SearchTerm::Text(value) => contains_text(&doc.text(), value, self.case_sensitive),
            SearchTerm::Tag(value) => doc.meta.hash_tags.iter().any(|tag| tag == value),
            SearchTerm::Board(value) => contains_text(doc.board_title, value, self.case_sensitive),
            SearchTerm::List(value) => contains_text(doc.list_title, value, self.case_sensitive),
            SearchTerm::IsCompleted(completed) => doc.card.completed == *completed,
            SearchTerm::Priority(priority) => doc.card.priority == *priority,
            SearchTerm::Due(mode) => self.matches_due(*mode, doc),
            SearchTerm::DueDate(target) => doc.meta.due_date == Some(*target),
            SearchTerm::Regex(regex) => regex.is_match(&doc.text()),
        }
    }

    fn matches_due(&self, mode: DueFilter, doc: &SearchDocument<'_>) -> bool {
        match mode {
            DueFilter::Any => doc.meta.due_date.is_some(),
            DueFilter::Overdue => doc.meta.is_overdue,
            DueFilter::Today => doc.meta.due_date == Some(self.today),
            DueFilter::Week => doc
                .meta
                .due_date
                .map(|d| d >= self.week_start && d <= self.week_end)
                .unwrap_or(false),
            DueFilter::Future => doc.meta.due_date.map(|d| d > self.today).unwrap_or(false),
        }
    }
}

/// A search result entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub board_id: String,
    pub board_title: String,
    pub list_id: String,
    pub list_title: String,
    pub card_id: String,
    pub card_title: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hash_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_overdue: bool,
}

/// Run a query over every card in non-archived lists.
pub fn search_boards(
    boards: &[KanbanBoard],
    query: &str,
    options: SearchOptions,
    today: NaiveDate,
) -> Vec<SearchHit> {
    let engine = SearchEngine::compile(query, options, today);
    if engine.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for board in boards {
        for list in board.lists.iter().filter(|l| !l.archived) {
            for card in &list.cards {
                let meta = SearchCardMeta::from_card(card, today);
                let doc = SearchDocument {
                    board_title: &board.title,
                    list_title: &list.title,
                    card,
                    meta: &meta,
                };
                if engine.matches(&doc) {
                    hits.push(SearchHit {
                        board_id: board.id.clone(),
                        board_title: board.title.clone(),
                        list_id: list.id.clone(),
                        list_title: list.title.clone(),
                        card_id: card.id.clone(),
                        card_title: card.title.clone(),
                        completed: card.completed,
                        priority: card.priority,
                        due_date: card.due_date.as_ref().map(format_iso),
                        is_overdue: meta.is_overdue,
                        hash_tags: meta.hash_tags,
                    });
                }
            }
        }
    }
    hits
}

fn split_query_tokens(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            if !in_quotes && !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(ch);
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_token(raw_token: String, case_sensitive: bool) -> Option<ParsedTerm> {
    let token = raw_token.trim();
    let (negate, token) = match token.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => (true, rest),
        _ => (false, token),
    };

    if token.is_empty() {
        return None;
    }

    if token.starts_with('#') {
        return Some(ParsedTerm {
            negate,
            term: SearchTerm::Tag(normalize_hash_tag(token)),
        });
    }

    if token.starts_with('/') && token.ends_with('/') && token.len() > 2 {
        if let Ok(regex) = Regex::new(&token[1..token.len() - 1]) {
            return Some(ParsedTerm {
                negate,
                term: SearchTerm::Regex(regex),
            });
        }
    }

    if let Some((key_raw, value_raw)) = token.split_once(':') {
        let key = key_raw.to_ascii_lowercase();
        let value = value_raw.trim();
        if value.is_empty() {
            return None;
        }
        let term = match key.as_str() {
            "is" => parse_is_term(value),
            "due" => parse_due_term(value),
            "priority" | "p" => Priority::parse(value).map(SearchTerm::Priority),
            "board" => Some(SearchTerm::Board(normalize_case(value, case_sensitive))),
            "list" | "col" | "column" => Some(SearchTerm::List(normalize_case(value, case_sensitive))),
            "tag" => Some(SearchTerm::Tag(normalize_hash_tag(value))),
            "re" | "regex" => Regex::new(value).ok().map(SearchTerm::Regex),
            _ => None,
        };
        if let Some(term) = term {
            return Some(ParsedTerm { negate, term });
        }
    }

    Some(ParsedTerm {
        negate,
        term: SearchTerm::Text(normalize_case(token, case_sensitive)),
    })
}

fn parse_is_term(value: &str) -> Option<SearchTerm> {
    match value.to_ascii_lowercase().as_str() {
        "open" | "todo" | "active" => Some(SearchTerm::IsCompleted(false)),
        "done" | "completed" | "closed" => Some(SearchTerm::IsCompleted(true)),
        _ => None,
    }
}

fn parse_due_term(value: &str) -> Option<SearchTerm> {
    match value.to_ascii_lowercase().as_str() {
        "any" => Some(SearchTerm::Due(DueFilter::Any)),
        "overdue" => Some(SearchTerm::Due(DueFilter::Overdue)),
        "today" => Some(SearchTerm::Due(DueFilter::Today)),
        "week" | "thisweek" => Some(SearchTerm::Due(DueFilter::Week)),
        "future" | "upcoming" => Some(SearchTerm::Due(DueFilter::Future)),
        _ => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(SearchTerm::DueDate),
    }
}

/// Unicode-aware normalization for search: lowercases, NFD-decomposes, and
/// strips combining marks (accents).
fn normalize_for_search(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

fn normalize_case(value: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        value.to_string()
    } else {
        normalize_for_search(value)
    }
}

fn normalize_hash_tag(value: &str) -> String {
    let mut tag = normalize_for_search(value.trim().trim_matches('"'));
    if !tag.starts_with('#') {
        tag.insert(0, '#');
    }
    tag
}

fn contains_text(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(needle)
    } else {
        normalize_for_search(haystack).contains(&normalize_for_search(needle))
    }
}

fn hash_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)(#[^\s#@]+)").expect("valid hash tag regex"))
}

fn extract_hash_tags(content: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for captures in hash_tag_regex().captures_iter(content) {
        if let Some(raw) = captures.get(1).map(|m| m.as_str()) {
            let normalized = normalize_hash_tag(raw.trim_end_matches(|c: char| ",.;)".contains(c)));
            if !tags.contains(&normalized) {
                tags.push(normalized);
            }
        }
    }
    tags
}
