//! Heading detection for extracted PDF text.
//!
//! PDFs carry no heading markup, so structure is inferred per line with an
//! ordered rule table. The table order is a contract: rules are evaluated
//! first-match-wins, and reordering them changes the output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines at or above this length never match the uppercase rule.
const UPPERCASE_MAX_LEN: usize = 50;

/// Minimum ratio of uppercase letters for the uppercase rule.
const UPPERCASE_MIN_RATIO: f32 = 0.7;

static ENUMERATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9一二三四五六七八九十百千]+[.、]").unwrap());

static CHAPTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(第\s*[0-9一二三四五六七八九十百千]+\s*章|(?i:chapter)\s+[0-9]+)").unwrap()
});

static SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(第\s*[0-9一二三四五六七八九十百千]+\s*[节節]|(?i:section)\s+[0-9]+)").unwrap()
});

/// A single classification rule: a predicate plus the level it assigns.
struct HeadingRule {
    name: &'static str,
    matches: fn(&str) -> bool,
    level: fn(&str) -> u8,
}

/// Ordered rule table, first match wins:
/// 1. enumerated numeral prefix (`1.`, `一、`, `1.1`)
/// 2. chapter marker (`第N章`, `Chapter N`)
/// 3. section marker (`第N节`, `Section N`)
/// 4. short mostly-uppercase line
/// 5. trailing colon
static RULES: &[HeadingRule] = &[
    HeadingRule {
        name: "enumerated",
        matches: is_enumerated,
        level: enumerated_level,
    },
    HeadingRule {
        name: "chapter",
        matches: is_chapter,
        level: |_| 1,
    },
    HeadingRule {
        name: "section",
        matches: is_section,
        level: |_| 2,
    },
    HeadingRule {
        name: "uppercase",
        matches: is_short_uppercase,
        level: |_| 3,
    },
    HeadingRule {
        name: "colon",
        matches: ends_with_colon,
        level: |_| 3,
    },
];

/// Classify a cleaned, trimmed line. Returns the heading level (1-6) or
/// `None` for body text.
pub fn classify_heading(line: &str) -> Option<u8> {
    if line.is_empty() {
        return None;
    }
    let rule = RULES.iter().find(|r| (r.matches)(line))?;
    log::debug!("heading rule '{}' matched: {}", rule.name, line);
    Some((rule.level)(line))
}

fn is_enumerated(line: &str) -> bool {
    ENUMERATED.is_match(line)
}

/// Level from the count of internal separator dots in the leading token:
/// `1.` has none (level 2), `1.1` one (level 3), `1.1.1` two or more (level 4).
fn enumerated_level(line: &str) -> u8 {
    let token = line.split_whitespace().next().unwrap_or(line);
    let token = token.trim_end_matches(['.', '、']);
    match token.matches('.').count() {
        0 => 2,
        1 => 3,
        _ => 4,
    }
}

fn is_chapter(line: &str) -> bool {
    CHAPTER.is_match(line)
}

fn is_section(line: &str) -> bool {
    SECTION.is_match(line)
}

fn is_short_uppercase(line: &str) -> bool {
    if line.chars().count() >= UPPERCASE_MAX_LEN {
        return false;
    }
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return false;
    }
    let uppercase = letters.iter().filter(|c| c.is_uppercase()).count();
    uppercase as f32 / letters.len() as f32 > UPPERCASE_MIN_RATIO
}

fn ends_with_colon(line: &str) -> bool {
    line.ends_with(':') || line.ends_with('：')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_markers_are_level_one() {
        assert_eq!(classify_heading("第一章 概述"), Some(1));
        assert_eq!(classify_heading("第12章 实现"), Some(1));
        assert_eq!(classify_heading("Chapter 3"), Some(1));
        assert_eq!(classify_heading("CHAPTER 3"), Some(1));
    }

    #[test]
    fn test_section_markers_are_level_two() {
        assert_eq!(classify_heading("第二节 背景"), Some(2));
        assert_eq!(classify_heading("Section 4 Details"), Some(2));
    }

    #[test]
    fn test_enumerated_levels_follow_dot_count() {
        assert_eq!(classify_heading("1. Introduction"), Some(2));
        assert_eq!(classify_heading("1.1 Background"), Some(3));
        assert_eq!(classify_heading("2.3.1 Edge cases"), Some(4));
        assert_eq!(classify_heading("一、概述"), Some(2));
    }

    #[test]
    fn test_short_uppercase_is_level_three() {
        assert_eq!(classify_heading("ALL CAPS SHORT"), Some(3));
        // Long uppercase lines stay body text.
        let long = "A".repeat(60);
        assert_eq!(classify_heading(&long), None);
    }

    #[test]
    fn test_trailing_colon_is_level_three() {
        assert_eq!(classify_heading("Prerequisites:"), Some(3));
        assert_eq!(classify_heading("前提条件："), Some(3));
    }

    #[test]
    fn test_plain_sentences_are_body() {
        assert_eq!(
            classify_heading("This is a plain sentence of body text."),
            None
        );
        assert_eq!(classify_heading("2024 was a good year overall"), None);
        assert_eq!(classify_heading(""), None);
    }

    #[test]
    fn test_rule_order_enumeration_before_colon() {
        // Matches both the enumeration and colon rules; enumeration wins.
        assert_eq!(classify_heading("1.1 Setup:"), Some(3));
    }
}
