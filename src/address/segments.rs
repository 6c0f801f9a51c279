//! Positional helpers over delimited address text.
//!
//! Every accessor counts 1-based from the end ("last" is 1) and returns
//! `None` instead of panicking when the text has too few segments.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MULTI_SPACE: Regex = Regex::new(r"\s{2,}").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
}

/// Comma-delimited view over an address, with segments kept untrimmed.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Segments<'a> {
    pub fn split(text: &'a str, delimiter: &str) -> Self {
        Self {
            parts: text.split(delimiter).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Segment `n` counting from the end, untrimmed.
    pub fn from_end(&self, n: usize) -> Option<&'a str> {
        if n == 0 || n > self.parts.len() {
            return None;
        }
        Some(self.parts[self.parts.len() - n])
    }

    /// Segment `n` counting from the end, trimmed.
    pub fn trimmed_from_end(&self, n: usize) -> Option<&'a str> {
        self.from_end(n).map(str::trim)
    }

    pub fn last(&self) -> Option<&'a str> {
        self.from_end(1)
    }

    pub fn second_to_last(&self) -> Option<&'a str> {
        self.from_end(2)
    }

    pub fn third_to_last(&self) -> Option<&'a str> {
        self.from_end(3)
    }
}

pub fn contains_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// First run of ASCII digits in `text`.
pub fn first_digit_run(text: &str) -> Option<&str> {
    DIGIT_RUN.find(text).map(|m| m.as_str())
}

/// Collapse runs of two or more whitespace characters into one space.
pub fn collapse_spaces(text: &str) -> String {
    MULTI_SPACE.replace_all(text, " ").into_owned()
}

pub fn whitespace_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_whitespace()).count()
}
