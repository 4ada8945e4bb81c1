//! Place name normalization
//!
//! Turns user-typed place names into the canonical form used as the
//! location de-duplication key: trimmed, single-spaced, title-cased.

use serde::Serialize;

use crate::utils::validation::WHITESPACE_RUN;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceNormalization {
    pub normalized: String,
    /// What was changed, for debug logging
    pub notes: Vec<&'static str>,
}

/// Normalize a raw place name. Idempotent.
pub fn normalize_place_name(raw: &str) -> PlaceNormalization {
    let mut notes = Vec::new();

    let trimmed = raw.trim();
    if trimmed != raw {
        notes.push("Trimmed whitespace");
    }

    let collapsed = WHITESPACE_RUN.replace_all(trimmed, " ");
    if collapsed != trimmed {
        notes.push("Collapsed multiple spaces");
    }

    let normalized = collapsed
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    PlaceNormalization { normalized, notes }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut upper = first.to_uppercase();
    let mut out = String::with_capacity(word.len());
    // Characters that uppercase to several (e.g. 'ß') are kept as they are.
    match (upper.next(), upper.next()) {
        (Some(single), None) => out.push(single),
        _ => out.extend(first.to_lowercase()),
    }
    out.push_str(&chars.as_str().to_lowercase());
    out
}
