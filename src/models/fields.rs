// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Field value store shared by single-record and batch editing.
//!
//! [`Fields`] always carries a slot for every [`FieldName`]; a slot holds either
//! a concrete value or the [`FieldValue::Mixed`] sentinel used when a batch of
//! records disagrees. [`FieldsPatch`] is the partial update merged into it.

use std::fmt;

use crate::models::record::{RecordFields, SharingMode};
use crate::models::tags::Tags;

/// Editable attributes, in form order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Name,
    Description,
    Tags,
    SharingMode,
}

impl FieldName {
    pub const ALL: [FieldName; 4] = [
        FieldName::Name,
        FieldName::Description,
        FieldName::Tags,
        FieldName::SharingMode,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Description => "Description",
            Self::Tags => "Tags",
            Self::SharingMode => "Sharing",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A field's current value, or the sentinel for "records disagree".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue<T> {
    Value(T),
    Mixed,
}

impl<T> FieldValue<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Mixed => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Self::Mixed)
    }
}

impl<T: PartialEq + Clone> FieldValue<T> {
    /// Collapse many values into one: equal values keep it, anything else is `Mixed`.
    pub fn reduce<'a, I>(mut values: I) -> Self
    where
        I: Iterator<Item = &'a T>,
        T: 'a,
    {
        let Some(first) = values.next() else {
            return Self::Mixed;
        };
        if values.all(|v| v == first) {
            Self::Value(first.clone())
        } else {
            Self::Mixed
        }
    }

    /// Overwrite with `next`; returns whether the slot changed.
    fn assign(&mut self, next: &T) -> bool {
        if self.value() == Some(next) {
            return false;
        }
        *self = Self::Value(next.clone());
        true
    }
}

/// Current values of every editable field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fields {
    pub name: FieldValue<String>,
    pub description: FieldValue<String>,
    pub tags: FieldValue<Tags>,
    pub sharing_mode: FieldValue<SharingMode>,
}

impl Fields {
    /// Reduce the fields of one or more records.
    pub fn reduce<'a>(records: impl Iterator<Item = &'a RecordFields> + Clone) -> Self {
        Self {
            name: FieldValue::reduce(records.clone().map(|r| &r.name)),
            description: FieldValue::reduce(records.clone().map(|r| &r.description)),
            tags: FieldValue::reduce(records.clone().map(|r| &r.tags)),
            sharing_mode: FieldValue::reduce(records.map(|r| &r.sharing_mode)),
        }
    }

    pub fn is_mixed(&self, field: FieldName) -> bool {
        match field {
            FieldName::Name => self.name.is_mixed(),
            FieldName::Description => self.description.is_mixed(),
            FieldName::Tags => self.tags.is_mixed(),
            FieldName::SharingMode => self.sharing_mode.is_mixed(),
        }
    }

    /// Shallow-merge `patch`; returns the fields whose value actually changed.
    pub fn merge(&mut self, patch: &FieldsPatch) -> Vec<FieldName> {
        let mut changed = Vec::new();
        if let Some(name) = &patch.name
            && self.name.assign(name)
        {
            changed.push(FieldName::Name);
        }
        if let Some(description) = &patch.description
            && self.description.assign(description)
        {
            changed.push(FieldName::Description);
        }
        if let Some(tags) = &patch.tags
            && self.tags.assign(tags)
        {
            changed.push(FieldName::Tags);
        }
        if let Some(mode) = &patch.sharing_mode
            && self.sharing_mode.assign(mode)
        {
            changed.push(FieldName::SharingMode);
        }
        changed
    }

    /// Build a patch carrying the current concrete values of `fields`.
    pub fn patch_for(&self, fields: impl IntoIterator<Item = FieldName>) -> FieldsPatch {
        let mut patch = FieldsPatch::default();
        for field in fields {
            match field {
                FieldName::Name => patch.name = self.name.value().cloned(),
                FieldName::Description => patch.description = self.description.value().cloned(),
                FieldName::Tags => patch.tags = self.tags.value().cloned(),
                FieldName::SharingMode => patch.sharing_mode = self.sharing_mode.value().copied(),
            }
        }
        patch
    }
}

impl From<&RecordFields> for Fields {
    fn from(fields: &RecordFields) -> Self {
        Self::reduce(std::iter::once(fields))
    }
}

/// Partial update: `Some` slots are written, `None` slots are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldsPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Tags>,
    pub sharing_mode: Option<SharingMode>,
}

impl FieldsPatch {
    pub fn name(value: impl Into<String>) -> Self {
        Self {
            name: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn description(value: impl Into<String>) -> Self {
        Self {
            description: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn tags(value: Tags) -> Self {
        Self {
            tags: Some(value),
            ..Default::default()
        }
    }

    pub fn sharing_mode(value: SharingMode) -> Self {
        Self {
            sharing_mode: Some(value),
            ..Default::default()
        }
    }

    /// Fields this patch writes.
    pub fn touched(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|f| match f {
                FieldName::Name => self.name.is_some(),
                FieldName::Description => self.description.is_some(),
                FieldName::Tags => self.tags.is_some(),
                FieldName::SharingMode => self.sharing_mode.is_some(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.touched().is_empty()
    }

    /// Write the patch onto a concrete record.
    pub fn apply_to(&self, record: &mut RecordFields) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(tags) = &self.tags {
            record.tags = tags.clone();
        }
        if let Some(mode) = self.sharing_mode {
            record.sharing_mode = mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, description: &str) -> RecordFields {
        RecordFields {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[test]
    fn reduce_keeps_common_values_and_marks_differences() {
        let records = [fields("Box A", "room temp"), fields("Box B", "room temp")];
        let reduced = Fields::reduce(records.iter());

        assert!(reduced.name.is_mixed());
        assert_eq!(reduced.description.value().map(String::as_str), Some("room temp"));
        assert_eq!(reduced.tags, FieldValue::Value(Tags::default()));
    }

    #[test]
    fn merge_reports_only_real_changes() {
        let mut current = Fields::from(&fields("Box", ""));
        let patch = FieldsPatch::name("Crate");

        assert_eq!(current.merge(&patch), vec![FieldName::Name]);
        assert!(current.merge(&patch).is_empty());
        assert_eq!(current.name.value().map(String::as_str), Some("Crate"));
    }

    #[test]
    fn merge_replaces_mixed_sentinel() {
        let records = [fields("A1", ""), fields("B2", "")];
        let mut current = Fields::reduce(records.iter());

        current.merge(&FieldsPatch::name("Common"));
        assert_eq!(current.name, FieldValue::Value("Common".to_string()));
    }

    #[test]
    fn patch_for_skips_mixed_slots() {
        let records = [fields("A1", "same"), fields("B2", "same")];
        let current = Fields::reduce(records.iter());

        let patch = current.patch_for([FieldName::Name, FieldName::Description]);
        assert_eq!(patch.name, None);
        assert_eq!(patch.description.as_deref(), Some("same"));
        assert_eq!(patch.touched(), vec![FieldName::Description]);
    }
}
