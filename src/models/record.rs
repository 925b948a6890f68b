// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Inventory record domain model (UI-agnostic).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::tags::Tags;

/// Kinds of inventory records we know how to edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Container,
    Sample,
    Subsample,
    Template,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Container,
        RecordKind::Sample,
        RecordKind::Subsample,
        RecordKind::Template,
    ];

    /// Global id prefix used by the inventory.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Container => "IC",
            Self::Sample => "SA",
            Self::Subsample => "SS",
            Self::Template => "IT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Sample => "Sample",
            Self::Subsample => "Subsample",
            Self::Template => "Template",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }
}

/// Inventory-wide identifier such as `IC12` or `SA3`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GlobalId {
    kind: RecordKind,
    number: u64,
}

impl GlobalId {
    pub fn new(kind: RecordKind, number: u64) -> Self {
        Self { kind, number }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.number)
    }
}

impl FromStr for GlobalId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.len() < 3 || !raw.is_char_boundary(2) {
            return Err(format!("Invalid global id: {raw:?}"));
        }
        let (prefix, digits) = raw.split_at(2);
        let kind = RecordKind::from_prefix(&prefix.to_ascii_uppercase())
            .ok_or_else(|| format!("Unknown global id prefix: {prefix:?}"))?;
        let number = digits
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("Invalid global id number: {digits:?}"))?;
        Ok(Self::new(kind, number))
    }
}

impl TryFrom<String> for GlobalId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GlobalId> for String {
    fn from(id: GlobalId) -> Self {
        id.to_string()
    }
}

/// Who may see a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingMode {
    #[default]
    OwnerGroups,
    Whitelist,
    Public,
}

impl SharingMode {
    pub const ALL: [SharingMode; 3] = [
        SharingMode::OwnerGroups,
        SharingMode::Whitelist,
        SharingMode::Public,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::OwnerGroups => "Owner's groups",
            Self::Whitelist => "Selected groups",
            Self::Public => "Everyone",
        }
    }
}

/// The editable attributes every record kind shares.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub sharing_mode: SharingMode,
}

/// Single inventory record as stored by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub global_id: GlobalId,
    #[serde(flatten)]
    pub fields: RecordFields,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    /// Number of storage slots; only meaningful for containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Labels of occupied storage slots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occupied: Vec<String>,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        self.global_id.kind()
    }
}
