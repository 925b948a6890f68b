// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Per-form error flags grouped by section.

use std::collections::BTreeMap;

use crate::models::fields::FieldName;

/// Form sections that own their own error state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormSection {
    Overview,
    Details,
}

impl FormSection {
    /// Section a field is rendered in.
    pub fn of(field: FieldName) -> Self {
        match field {
            FieldName::Name | FieldName::Description => Self::Overview,
            FieldName::Tags | FieldName::SharingMode => Self::Details,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Details => "Details",
        }
    }
}

/// Error flags for one mounted form; valid when every flag is `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorMap {
    flags: BTreeMap<FormSection, BTreeMap<FieldName, bool>>,
}

impl ErrorMap {
    /// Callback leaf fields report through whenever their error state is recomputed.
    pub fn on_error_state_change(&mut self, section: FormSection, field: FieldName, error: bool) {
        self.flags.entry(section).or_default().insert(field, error);
    }

    pub fn section_has_error(&self, section: FormSection) -> bool {
        self.flags
            .get(&section)
            .is_some_and(|fields| fields.values().any(|e| *e))
    }

    pub fn field_has_error(&self, field: FieldName) -> bool {
        self.flags
            .get(&FormSection::of(field))
            .and_then(|fields| fields.get(&field))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_valid(&self) -> bool {
        self.flags.values().flat_map(|f| f.values()).all(|e| !*e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_is_valid() {
        assert!(ErrorMap::default().is_valid());
    }

    #[test]
    fn any_flag_invalidates_and_clearing_restores() {
        let mut map = ErrorMap::default();
        map.on_error_state_change(FormSection::Overview, FieldName::Name, false);
        map.on_error_state_change(FormSection::Details, FieldName::Tags, true);

        assert!(!map.is_valid());
        assert!(map.section_has_error(FormSection::Details));
        assert!(!map.section_has_error(FormSection::Overview));
        assert!(map.field_has_error(FieldName::Tags));

        map.on_error_state_change(FormSection::Details, FieldName::Tags, false);
        assert!(map.is_valid());
    }
}
