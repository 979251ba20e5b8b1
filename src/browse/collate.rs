//! Locale-aware title comparison.
//!
//! Approximates a multilingual collator with three levels: base letters
//! (diacritics stripped, case folded), then accents, then case with lowercase
//! first. Vietnamese `đ` has no decomposition and is folded to `d` by hand.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Precomputed sort key for one title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: String,
    secondary: String,
    tertiary: String,
}

impl CollationKey {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let decomposed: String = text.nfd().collect();

        let primary = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .map(fold_stroke)
            .flat_map(char::to_lowercase)
            .collect();
        let secondary = decomposed.chars().flat_map(char::to_lowercase).collect();
        let tertiary = decomposed.chars().map(swap_case).collect();

        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

/// Compare two titles the way a reader expects them ordered.
#[must_use]
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

fn fold_stroke(c: char) -> char {
    match c {
        'đ' => 'd',
        'Đ' => 'D',
        other => other,
    }
}

// Codepoint order puts uppercase first; swapping makes lowercase win ties.
fn swap_case(c: char) -> char {
    if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else if c.is_uppercase() {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c
    }
}
