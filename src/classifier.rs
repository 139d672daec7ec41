// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Heuristic triage of screenshot text
//!
//! Scores the extracted text against per-category keyword lists (English and
//! German), pulls out dates, amounts and phone numbers, and flags sensitive
//! content. Everything here is local and deterministic.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;

use crate::model::{Category, SensitivityFlag, TriageResult};
use crate::ocr::TextExtractor;
use crate::Result;

static AMOUNT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[$€£]\s*\d+[.,]?\d*|\d+[.,]\d+\s*(?:USD|EUR|GBP)").unwrap()
});

static CREDIT_CARD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").unwrap());

static SSN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[ .-]?)?(?:\(\d{3}\)|\d{3})[ .-]\d{3,4}[ .-]?\d{4}\b").unwrap()
});

static ISO_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

static SLASH_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\b").unwrap());

static DOT_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{2,4})\b").unwrap());

static MONTH_FIRST_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b",
    )
    .unwrap()
});

static DAY_FIRST_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\.?\s+(jan|feb|mar|mär|apr|may|mai|jun|jul|aug|sep|okt|oct|nov|dez|dec)[a-zäöü]*\.?\s+(\d{4})\b",
    )
    .unwrap()
});

const PASSWORD_KEYWORDS: [&str; 5] = ["password", "passwort", "kennwort", "pin code", "secret key"];

const BANKING_KEYWORDS: [&str; 5] = [
    "account number",
    "routing number",
    "kontonummer",
    "bankleitzahl",
    "iban",
];

/// Classifies screenshots from their text content
pub struct TriageClassifier {
    extractor: Arc<dyn TextExtractor>,
}

impl TriageClassifier {
    /// Create a classifier backed by the given text extractor
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Name of the underlying extraction engine
    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Triage a screenshot. Text extraction runs only when `text` is empty,
    /// so callers with pre-extracted text never pay for it twice.
    pub async fn classify(&self, text: &str, path: &Path) -> Result<TriageResult> {
        let start = Instant::now();

        let extracted = if text.is_empty() {
            self.extractor.extract_text(path).await?
        } else {
            text.to_string()
        };

        let (category, confidence) = detect_category(&extracted);
        let entities = extract_entities(&extracted);
        let sensitivity_flags = detect_sensitivity(&extracted);

        Ok(TriageResult {
            category,
            confidence,
            extracted_text: extracted,
            entities,
            sensitivity_flags,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Score the text against every category's keywords.
///
/// Score is matched keywords over total keywords, doubled and capped at 1.0
/// for the reported confidence. Ties resolve to the category declared first
/// in `Category::ALL`. Text with no matches at all is `Other` at 0.3.
pub fn detect_category(text: &str) -> (Category, f64) {
    let lowercased = text.to_lowercase();

    let mut best: Option<(Category, f64)> = None;
    for category in Category::ALL {
        let keywords = category.keywords();
        if keywords.is_empty() {
            continue;
        }

        let matched = keywords.iter().filter(|k| lowercased.contains(*k)).count();
        if matched == 0 {
            continue;
        }

        let score = matched as f64 / keywords.len() as f64;
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((category, score)),
        }
    }

    match best {
        Some((category, score)) => (category, (score * 2.0).min(1.0)),
        None => (Category::Other, 0.3),
    }
}

/// Extract dates, amounts and phone numbers from the text.
///
/// Keys are per-kind counters in match order: up to three `date_*`, three
/// `amount_*` and two `phone_*` entries.
pub fn extract_entities(text: &str) -> BTreeMap<String, String> {
    let mut entities = BTreeMap::new();

    for (i, value) in extract_dates(text).into_iter().enumerate() {
        entities.insert(format!("date_{}", i), value);
    }

    for (i, m) in AMOUNT_REGEX.find_iter(text).take(3).enumerate() {
        entities.insert(format!("amount_{}", i), m.as_str().to_string());
    }

    // A 16-digit card number also looks like a phone number to the loose
    // phone pattern, so matches inside card spans are rejected
    let card_spans: Vec<(usize, usize)> = CREDIT_CARD_REGEX
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut phones = 0usize;
    for m in PHONE_REGEX.find_iter(text) {
        if phones == 2 {
            break;
        }
        if card_spans.iter().any(|&(s, e)| m.start() < e && s < m.end()) {
            continue;
        }
        entities.insert(format!("phone_{}", phones), m.as_str().to_string());
        phones += 1;
    }

    entities
}

/// Detect sensitive content. Flags appear in a fixed order: credit card,
/// password, SSN, banking.
pub fn detect_sensitivity(text: &str) -> Vec<SensitivityFlag> {
    let lowercased = text.to_lowercase();
    let mut flags = Vec::new();

    if CREDIT_CARD_REGEX.is_match(text) {
        flags.push(SensitivityFlag::CreditCard);
    }

    if PASSWORD_KEYWORDS.iter().any(|k| lowercased.contains(k)) {
        flags.push(SensitivityFlag::Password);
    }

    if SSN_REGEX.is_match(text) {
        flags.push(SensitivityFlag::Ssn);
    }

    if BANKING_KEYWORDS.iter().any(|k| lowercased.contains(k)) {
        flags.push(SensitivityFlag::Banking);
    }

    flags
}

/// Find dates in several written forms, normalized to "Mar 12, 2024" style.
/// Capped at three, in order of appearance.
fn extract_dates(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, usize, NaiveDate)> = Vec::new();

    for caps in ISO_DATE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (Some(y), Some(m), Some(d)) = (
            parse_num::<i32>(&caps, 1),
            parse_num::<u32>(&caps, 2),
            parse_num::<u32>(&caps, 3),
        ) else {
            continue;
        };
        if let Some(date) = date_from_parts(y, m, d) {
            found.push((whole.start(), whole.end(), date));
        }
    }

    for caps in SLASH_DATE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (Some(a), Some(b), Some(y)) = (
            parse_num::<u32>(&caps, 1),
            parse_num::<u32>(&caps, 2),
            parse_num::<i32>(&caps, 3),
        ) else {
            continue;
        };
        // Slashes read month-first, unless the month slot cannot be one
        let (m, d) = if a > 12 && b <= 12 { (b, a) } else { (a, b) };
        if let Some(date) = date_from_parts(y, m, d) {
            found.push((whole.start(), whole.end(), date));
        }
    }

    for caps in DOT_DATE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (Some(a), Some(b), Some(y)) = (
            parse_num::<u32>(&caps, 1),
            parse_num::<u32>(&caps, 2),
            parse_num::<i32>(&caps, 3),
        ) else {
            continue;
        };
        // Dots read day-first, unless the month slot cannot be one
        let (d, m) = if b > 12 && a <= 12 { (b, a) } else { (a, b) };
        if let Some(date) = date_from_parts(y, m, d) {
            found.push((whole.start(), whole.end(), date));
        }
    }

    for caps in MONTH_FIRST_DATE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(month) = caps.get(1).and_then(|m| month_number(m.as_str())) else {
            continue;
        };
        let (Some(d), Some(y)) = (parse_num::<u32>(&caps, 2), parse_num::<i32>(&caps, 3)) else {
            continue;
        };
        if let Some(date) = date_from_parts(y, month, d) {
            found.push((whole.start(), whole.end(), date));
        }
    }

    for caps in DAY_FIRST_DATE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(month) = caps.get(2).and_then(|m| month_number(m.as_str())) else {
            continue;
        };
        let (Some(d), Some(y)) = (parse_num::<u32>(&caps, 1), parse_num::<i32>(&caps, 3)) else {
            continue;
        };
        if let Some(date) = date_from_parts(y, month, d) {
            found.push((whole.start(), whole.end(), date));
        }
    }

    found.sort_by_key(|&(start, _, _)| start);

    let mut dates = Vec::new();
    let mut last_end = 0usize;
    for (start, end, date) in found {
        if dates.len() == 3 {
            break;
        }
        if start < last_end {
            continue;
        }
        dates.push(date.format("%b %-d, %Y").to_string());
        last_end = end;
    }

    dates
}

fn parse_num<T: std::str::FromStr>(caps: &regex::Captures, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}

fn date_from_parts(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let year = if year < 100 { year + 2000 } else { year };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" | "mär" => Some(3),
        "apr" => Some(4),
        "may" | "mai" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "okt" | "oct" => Some(10),
        "nov" => Some(11),
        "dez" | "dec" => Some(12),
        _ => None,
    }
}
