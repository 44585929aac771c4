use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

pub const DISCIPLINE_MARKER: &str = "ARC0";
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Compiled recognizers for drawing numbers, revision codes and dates.
///
/// Every finder is total: text without a match yields an empty vector.
#[derive(Debug, Clone)]
pub struct Recognizers {
    drawing_number: Regex,
    revision_code: Regex,
    date: Regex,
    reference_marker: Regex,
}

impl Recognizers {
    pub fn new() -> Result<Self> {
        Ok(Self {
            drawing_number: Regex::new(r"\d{4}_SOC-[A-Z0-9\-]+-ARC0-\d{5}")
                .context("failed to compile drawing number regex")?,
            revision_code: Regex::new(r"\b(?:C\d{2}|P\d{2})\b")
                .context("failed to compile revision code regex")?,
            date: Regex::new(r"\d{4}[./-]\d{2}[./-]\d{2}").context("failed to compile date regex")?,
            reference_marker: Regex::new(r"(?i)REFERENCE DRAWINGS")
                .context("failed to compile reference drawings marker regex")?,
        })
    }

    pub fn find_drawing_numbers(&self, text: &str) -> Vec<String> {
        self.drawing_number
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn find_revision_codes(&self, text: &str) -> Vec<String> {
        self.revision_code
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Dates in reading order, separators rewritten to `/`.
    pub fn find_dates(&self, text: &str) -> Vec<String> {
        self.date
            .find_iter(text)
            .map(|m| normalize_date_separators(m.as_str()))
            .collect()
    }

    /// Normalized date of a batch folder name, if it names a real calendar day.
    pub fn parse_folder_date(&self, folder_name: &str) -> Option<String> {
        let raw = self.date.find(folder_name)?;
        let normalized = normalize_date_separators(raw.as_str());
        NaiveDate::parse_from_str(&normalized, DATE_FORMAT).ok()?;
        Some(normalized)
    }

    /// Splits page text at the first "REFERENCE DRAWINGS" heading. The second
    /// half is empty when the page has no such heading.
    ///
    /// Everything after the first heading is reference text, including any
    /// later repeat of the heading and the text that follows it.
    pub fn split_reference_section<'a>(&self, text: &'a str) -> (&'a str, &'a str) {
        match self.reference_marker.find(text) {
            Some(marker) => (&text[..marker.start()], &text[marker.end()..]),
            None => (text, ""),
        }
    }
}

pub fn normalize_date_separators(raw: &str) -> String {
    raw.replace(['.', '-'], "/")
}

pub fn parse_batch_date(batch_date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(batch_date, DATE_FORMAT).ok()
}

pub fn first_revision<'a>(codes: &'a [String], family: char) -> Option<&'a str> {
    codes
        .iter()
        .find(|code| code.starts_with(family))
        .map(String::as_str)
}

pub fn last_revision<'a>(codes: &'a [String], family: char) -> Option<&'a str> {
    codes
        .iter()
        .rev()
        .find(|code| code.starts_with(family))
        .map(String::as_str)
}

pub fn has_discipline_marker(file_name: &str) -> bool {
    file_name.contains(DISCIPLINE_MARKER)
}
