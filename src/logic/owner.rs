// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Field owners: the editing target a form is bound to.
//!
//! A form edits either one live record ([`RecordOwner`]) or a synthesized batch
//! pseudo-record standing in for a whole selection ([`BatchCollection`]). Both
//! implement [`FieldOwner`], so form code never branches on which one it has.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::logic::validation::NameSuffix;
use crate::models::fields::{FieldName, Fields, FieldsPatch};
use crate::models::record::{GlobalId, Record};

/// Programmer or selection errors raised while building or mutating an owner.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OwnerError {
    #[error("Nothing is selected to edit.")]
    EmptySelection,
    #[error("Batch editing needs records of one kind; found {first} and {other}.")]
    MixedKinds {
        first: &'static str,
        other: &'static str,
    },
    #[error("{0} is not editable right now.")]
    FieldNotEditable(FieldName),
}

/// Changes to send to the inventory for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordUpdate {
    pub global_id: GlobalId,
    pub patch: FieldsPatch,
}

/// Unified editing surface for single records and batches.
pub trait FieldOwner {
    /// Current value of every editable field.
    fn field_values(&self) -> &Fields;

    fn is_field_editable(&self, field: FieldName) -> bool;

    /// Opt a field in or out of editing. Only batch owners honour this.
    fn set_field_editable(&mut self, field: FieldName, editable: bool);

    /// Merge `patch` into the field values and mark the touched fields dirty.
    ///
    /// Returns whether anything observable changed; applying the same patch
    /// twice reports `false` the second time.
    ///
    /// # Errors
    ///
    /// Rejects the whole patch when it writes a field that is not editable.
    fn set_fields_dirty(&mut self, patch: &FieldsPatch) -> Result<bool, OwnerError>;

    fn can_choose_which_to_edit(&self) -> bool;

    /// Placeholder shown for a field whose records disagree.
    fn no_value_label(&self, field: FieldName) -> Option<&'static str>;

    fn dirty_fields(&self) -> &BTreeSet<FieldName>;

    fn is_dirty(&self) -> bool {
        !self.dirty_fields().is_empty()
    }

    /// Bumped on every observable change; views use it to detect staleness.
    fn revision(&self) -> u64;

    /// Records behind this owner, in selection order.
    fn records(&self) -> &[Record];

    /// Per-record updates to submit. Empty when there is nothing to send.
    fn submission(&self, suffix: NameSuffix) -> Vec<RecordUpdate>;

    /// Drop unsaved values and return to the records' stored state.
    fn discard_changes(&mut self);
}

/// Values plus dirty bookkeeping shared by both owners.
#[derive(Clone, Debug)]
struct FieldStore {
    values: Fields,
    dirty: BTreeSet<FieldName>,
    revision: u64,
}

impl FieldStore {
    fn new(values: Fields) -> Self {
        Self {
            values,
            dirty: BTreeSet::new(),
            revision: 0,
        }
    }

    fn merge(&mut self, patch: &FieldsPatch) -> bool {
        let changed = self.values.merge(patch);
        let mut observable = !changed.is_empty();
        for field in patch.touched() {
            observable |= self.dirty.insert(field);
        }
        if observable {
            self.revision += 1;
        }
        observable
    }

    fn reset(&mut self, values: Fields) {
        self.values = values;
        self.dirty.clear();
        self.revision += 1;
    }
}

fn check_editable(owner: &impl FieldOwner, patch: &FieldsPatch) -> Result<(), OwnerError> {
    match patch
        .touched()
        .into_iter()
        .find(|f| !owner.is_field_editable(*f))
    {
        Some(field) => Err(OwnerError::FieldNotEditable(field)),
        None => Ok(()),
    }
}

/// Owner wrapping exactly one record.
#[derive(Clone, Debug)]
pub struct RecordOwner {
    record: [Record; 1],
    store: FieldStore,
    editing: bool,
}

impl RecordOwner {
    pub fn new(record: Record) -> Self {
        let store = FieldStore::new(Fields::from(&record.fields));
        Self {
            record: [record],
            store,
            editing: false,
        }
    }

    pub fn begin_editing(&mut self) {
        if !self.editing {
            self.editing = true;
            self.store.revision += 1;
        }
    }
}

impl FieldOwner for RecordOwner {
    fn field_values(&self) -> &Fields {
        &self.store.values
    }

    fn is_field_editable(&self, _field: FieldName) -> bool {
        self.editing
    }

    fn set_field_editable(&mut self, field: FieldName, editable: bool) {
        tracing::debug!(%field, editable, "ignoring editability toggle on single record");
    }

    fn set_fields_dirty(&mut self, patch: &FieldsPatch) -> Result<bool, OwnerError> {
        check_editable(&*self, patch)?;
        Ok(self.store.merge(patch))
    }

    fn can_choose_which_to_edit(&self) -> bool {
        false
    }

    fn no_value_label(&self, _field: FieldName) -> Option<&'static str> {
        None
    }

    fn dirty_fields(&self) -> &BTreeSet<FieldName> {
        &self.store.dirty
    }

    fn revision(&self) -> u64 {
        self.store.revision
    }

    fn records(&self) -> &[Record] {
        &self.record
    }

    fn submission(&self, _suffix: NameSuffix) -> Vec<RecordUpdate> {
        let patch = self.store.values.patch_for(self.store.dirty.iter().copied());
        if patch.is_empty() {
            return Vec::new();
        }
        vec![RecordUpdate {
            global_id: self.record[0].global_id.clone(),
            patch,
        }]
    }

    fn discard_changes(&mut self) {
        self.store.reset(Fields::from(&self.record[0].fields));
    }
}

/// Batch pseudo-record over a fixed, non-empty set of same-kind records.
///
/// The record set cannot change; a new selection builds a new collection.
#[derive(Clone, Debug)]
pub struct BatchCollection {
    records: Box<[Record]>,
    store: FieldStore,
    editable: BTreeSet<FieldName>,
}

impl BatchCollection {
    /// # Errors
    ///
    /// Fails for an empty selection or one mixing record kinds.
    pub fn new(records: Vec<Record>) -> Result<Self, OwnerError> {
        let first = records.first().ok_or(OwnerError::EmptySelection)?.kind();
        if let Some(other) = records.iter().map(Record::kind).find(|k| *k != first) {
            return Err(OwnerError::MixedKinds {
                first: first.label(),
                other: other.label(),
            });
        }

        let values = Fields::reduce(records.iter().map(|r| &r.fields));
        Ok(Self {
            records: records.into_boxed_slice(),
            store: FieldStore::new(values),
            editable: BTreeSet::new(),
        })
    }
}

impl FieldOwner for BatchCollection {
    fn field_values(&self) -> &Fields {
        &self.store.values
    }

    fn is_field_editable(&self, field: FieldName) -> bool {
        self.editable.contains(&field)
    }

    fn set_field_editable(&mut self, field: FieldName, editable: bool) {
        let changed = if editable {
            self.editable.insert(field)
        } else {
            self.editable.remove(&field)
        };
        if changed {
            self.store.revision += 1;
        }
    }

    fn set_fields_dirty(&mut self, patch: &FieldsPatch) -> Result<bool, OwnerError> {
        check_editable(&*self, patch)?;
        Ok(self.store.merge(patch))
    }

    fn can_choose_which_to_edit(&self) -> bool {
        true
    }

    fn no_value_label(&self, field: FieldName) -> Option<&'static str> {
        if !self.store.values.is_mixed(field) {
            return None;
        }
        Some(match field {
            FieldName::Name => "Multiple names",
            FieldName::Description => "Multiple descriptions",
            FieldName::Tags => "Multiple tag sets",
            FieldName::SharingMode => "Multiple sharing modes",
        })
    }

    fn dirty_fields(&self) -> &BTreeSet<FieldName> {
        &self.store.dirty
    }

    fn revision(&self) -> u64 {
        self.store.revision
    }

    fn records(&self) -> &[Record] {
        &self.records
    }

    fn submission(&self, suffix: NameSuffix) -> Vec<RecordUpdate> {
        let fields = self.store.dirty.intersection(&self.editable).copied();
        let base = self.store.values.patch_for(fields);
        if base.is_empty() {
            return Vec::new();
        }

        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut patch = base.clone();
                if let Some(name) = &base.name {
                    patch.name = Some(suffix.apply(name, index, record.created));
                }
                RecordUpdate {
                    global_id: record.global_id.clone(),
                    patch,
                }
            })
            .collect()
    }

    fn discard_changes(&mut self) {
        self.store
            .reset(Fields::reduce(self.records.iter().map(|r| &r.fields)));
    }
}

/// Choose the owner for a selection: one record edits it directly, several form a batch.
///
/// # Errors
///
/// See [`BatchCollection::new`].
pub fn owner_for_selection(mut records: Vec<Record>) -> Result<Box<dyn FieldOwner>, OwnerError> {
    match records.len() {
        0 => Err(OwnerError::EmptySelection),
        1 => {
            let mut owner = RecordOwner::new(records.remove(0));
            owner.begin_editing();
            Ok(Box::new(owner))
        }
        _ => Ok(Box::new(BatchCollection::new(records)?)),
    }
}
