// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Tag list domain helper.

use serde::{Deserialize, Serialize};

/// Separator used when tags are displayed or measured as one string.
pub const TAG_SEPARATOR: &str = ", ";

/// Ordered tag list with normalization kept in one place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags {
    items: Vec<String>,
}

impl Tags {
    pub fn new(items: Vec<String>) -> Self {
        let mut tags = Self { items };
        tags.normalize();
        tags
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.items.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Append a tag unless an equal one (ignoring ASCII case) is present.
    pub fn push(&mut self, tag: &str) -> bool {
        let trimmed = tag.trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.items.push(trimmed.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn joined(&self) -> String {
        self.items.join(TAG_SEPARATOR)
    }

    /// Length of [`Tags::joined`] in characters.
    pub fn joined_len(&self) -> usize {
        let chars: usize = self.items.iter().map(|t| t.chars().count()).sum();
        chars + TAG_SEPARATOR.len() * self.items.len().saturating_sub(1)
    }

    fn normalize(&mut self) {
        for tag in &mut self.items {
            let trimmed = tag.trim();
            if trimmed.len() != tag.len() {
                *tag = trimmed.to_string();
            }
        }
        // Dedup case-insensitively while preserving original casing of first occurrence.
        let mut seen = Vec::<String>::new();
        self.items.retain(|tag| {
            if tag.is_empty() {
                return false;
            }
            let lower = tag.to_ascii_lowercase();
            if seen.contains(&lower) {
                false
            } else {
                seen.push(lower);
                true
            }
        });
    }
}

impl From<Vec<String>> for Tags {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.items
    }
}
