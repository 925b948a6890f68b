// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Inventory backend: listing, record details and bulk updates.
//!
//! Responsibilities:
//! - Define the [`Inventory`] seam the application talks to.
//! - Provide [`LocalInventory`], a JSON-file backed implementation.
//! - Report bulk updates per item so partial failures reach the user.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::owner::RecordUpdate;
use crate::logic::search::{ResultsPage, SearchParams};
use crate::logic::validation::{
    FieldError, NameSuffix, validate_description, validate_name, validate_tags,
};
use crate::models::record::{GlobalId, Record, RecordKind};
use crate::utils::sanitize_component;

/// Per-item failures of a bulk update.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("{0} was not found.")]
    NotFound(GlobalId),
    #[error("{id}: {source}")]
    Invalid { id: GlobalId, source: FieldError },
}

/// Extra details fetched on demand for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdditionalInfo {
    pub global_id: GlobalId,
    pub capacity: Option<u32>,
    pub occupied: usize,
}

impl AdditionalInfo {
    /// Free storage slots; `None` for records that cannot hold anything.
    pub fn free_locations(&self) -> Option<u32> {
        self.capacity
            .map(|c| c.saturating_sub(u32::try_from(self.occupied).unwrap_or(u32::MAX)))
    }
}

/// Result of one item in a bulk update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkOutcome {
    pub global_id: GlobalId,
    pub result: Result<Record, InventoryError>,
}

/// Outcome of a bulk update, one entry per requested record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub outcomes: Vec<BulkOutcome>,
}

impl BulkReport {
    pub fn updated(&self) -> Vec<Record> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().cloned())
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn summary(&self) -> String {
        let failed = self.failed_count();
        let ok = self.outcomes.len() - failed;
        match (ok, failed) {
            (ok, 0) => format!("Updated {ok} record(s)."),
            (0, failed) => format!("Failed to update {failed} record(s)."),
            (ok, failed) => format!("Updated {ok} record(s); {failed} failed."),
        }
    }

    /// One line per failed item.
    pub fn details(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(ToString::to_string))
            .collect()
    }
}

/// The backend the application reads from and writes to.
pub trait Inventory: Send + Sync {
    /// Switch to the inventory stored at `path`; returns the record count.
    fn open(&self, path: &Path) -> Result<usize>;

    fn search(&self, params: &SearchParams) -> Result<ResultsPage>;

    fn additional_info(&self, id: &GlobalId) -> Result<AdditionalInfo>;

    /// Fetch records by id, in the requested order.
    fn records(&self, ids: &[GlobalId]) -> Result<Vec<Record>>;

    /// Apply each update independently and report per item.
    fn bulk_update(&self, updates: &[RecordUpdate]) -> BulkReport;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InventoryFile {
    records: Vec<Record>,
}

#[derive(Debug, Default)]
struct Store {
    path: Option<PathBuf>,
    records: Vec<Record>,
}

/// Inventory kept in memory and mirrored to a JSON file when one is open.
#[derive(Debug, Default)]
pub struct LocalInventory {
    store: Mutex<Store>,
}

impl LocalInventory {
    #[cfg(test)]
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| a.global_id.cmp(&b.global_id));
        Self {
            store: Mutex::new(Store {
                path: None,
                records,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inventory for LocalInventory {
    fn open(&self, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read inventory file: {:?}", path))?;
        let mut records = parse_inventory(&content)?;
        records.sort_by(|a, b| a.global_id.cmp(&b.global_id));

        let count = records.len();
        let mut store = self.lock();
        store.path = Some(path.to_path_buf());
        store.records = records;
        tracing::info!(path = %path.display(), count, "inventory opened");
        Ok(count)
    }

    fn search(&self, params: &SearchParams) -> Result<ResultsPage> {
        let store = self.lock();
        let matching: Vec<&Record> = store.records.iter().filter(|r| params.matches(r)).collect();
        let page_size = params.page_size.max(1);
        let records = matching
            .iter()
            .skip(params.page.saturating_mul(page_size))
            .take(page_size)
            .map(|r| (*r).clone())
            .collect();
        Ok(ResultsPage {
            records,
            total: matching.len(),
        })
    }

    fn additional_info(&self, id: &GlobalId) -> Result<AdditionalInfo> {
        let store = self.lock();
        let record = store
            .records
            .iter()
            .find(|r| &r.global_id == id)
            .ok_or_else(|| anyhow!(InventoryError::NotFound(id.clone())))?;
        let capacity = match record.kind() {
            RecordKind::Container => record.capacity,
            _ => None,
        };
        Ok(AdditionalInfo {
            global_id: id.clone(),
            capacity,
            occupied: record.occupied.len(),
        })
    }

    fn records(&self, ids: &[GlobalId]) -> Result<Vec<Record>> {
        let store = self.lock();
        ids.iter()
            .map(|id| {
                store
                    .records
                    .iter()
                    .find(|r| &r.global_id == id)
                    .cloned()
                    .ok_or_else(|| anyhow!(InventoryError::NotFound(id.clone())))
            })
            .collect()
    }

    fn bulk_update(&self, updates: &[RecordUpdate]) -> BulkReport {
        let mut store = self.lock();
        let outcomes: Vec<BulkOutcome> = updates
            .iter()
            .map(|update| BulkOutcome {
                global_id: update.global_id.clone(),
                result: apply_update(&mut store.records, update),
            })
            .collect();
        let report = BulkReport { outcomes };

        tracing::info!(
            requested = updates.len(),
            failed = report.failed_count(),
            "bulk update applied"
        );

        if let Some(path) = store.path.clone()
            && report.failed_count() < updates.len()
            && let Err(err) = write_inventory(&path, &store.records)
        {
            // In-memory edits stay applied even when the file write fails.
            tracing::error!(error = %err, "failed to persist inventory");
        }
        report
    }
}

/// Validate and apply one update in place.
fn apply_update(records: &mut [Record], update: &RecordUpdate) -> Result<Record, InventoryError> {
    let id = &update.global_id;
    let record = records
        .iter_mut()
        .find(|r| &r.global_id == id)
        .ok_or_else(|| InventoryError::NotFound(id.clone()))?;

    let patch = &update.patch;
    let error = patch
        .name
        .as_deref()
        .and_then(|n| validate_name(n, true, NameSuffix::None))
        .or_else(|| patch.description.as_deref().and_then(validate_description))
        .or_else(|| patch.tags.as_ref().and_then(validate_tags));
    if let Some(source) = error {
        return Err(InventoryError::Invalid {
            id: id.clone(),
            source,
        });
    }

    patch.apply_to(&mut record.fields);
    Ok(record.clone())
}

/// Parse an inventory JSON document, rejecting duplicate ids.
pub fn parse_inventory(json: &str) -> Result<Vec<Record>> {
    let file: InventoryFile =
        serde_json::from_str(json).context("Failed to parse inventory JSON")?;
    let mut seen = HashSet::new();
    for record in &file.records {
        if !seen.insert(&record.global_id) {
            return Err(anyhow!(
                "Duplicate record id in inventory: {}",
                record.global_id
            ));
        }
    }
    Ok(file.records)
}

fn write_inventory(path: &Path, records: &[Record]) -> Result<()> {
    let file = InventoryFile {
        records: records.to_vec(),
    };
    let json = serde_json::to_string_pretty(&file).context("Failed to serialize inventory")?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(path, json).with_context(|| format!("Failed to write inventory file: {:?}", path))
}

/// Write `records` as a standalone inventory document.
pub fn export_records(path: &Path, records: &[Record]) -> Result<()> {
    write_inventory(path, records)
}

/// Suggest an export filename from the current search query.
pub fn suggested_export_name(query: &str) -> String {
    let base = sanitize_component(query.trim()).to_ascii_lowercase();
    let base = if query.trim().is_empty() {
        "inventory_export"
    } else {
        &base
    };
    format!("{base}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::owner::tests::record;
    use crate::models::fields::FieldsPatch;
    use tempfile::TempDir;

    fn inventory() -> LocalInventory {
        let mut rack = record(RecordKind::Container, 3, "Rack", "");
        rack.capacity = Some(12);
        rack.occupied = vec!["A1".into(), "A2".into()];
        LocalInventory::from_records(vec![
            record(RecordKind::Container, 1, "Box A", "Stored at room temp"),
            record(RecordKind::Container, 2, "Box B", "Stored at room temp"),
            rack,
            record(RecordKind::Sample, 1, "Buffer", ""),
        ])
    }

    #[test]
    fn search_pages_and_counts() {
        let inv = inventory();
        let page = inv
            .search(&SearchParams {
                query: "box".into(),
                page: 1,
                page_size: 1,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].fields.name, "Box B");
    }

    #[test]
    fn additional_info_counts_free_locations() {
        let inv = inventory();
        let info = inv
            .additional_info(&GlobalId::new(RecordKind::Container, 3))
            .unwrap();
        assert_eq!(info.free_locations(), Some(10));

        let sample = inv
            .additional_info(&GlobalId::new(RecordKind::Sample, 1))
            .unwrap();
        assert_eq!(sample.free_locations(), None);

        assert!(
            inv.additional_info(&GlobalId::new(RecordKind::Sample, 9))
                .is_err()
        );
    }

    #[test]
    fn bulk_update_reports_per_item() {
        let inv = inventory();
        let updates = vec![
            RecordUpdate {
                global_id: GlobalId::new(RecordKind::Container, 1),
                patch: FieldsPatch::name("Freezer box"),
            },
            RecordUpdate {
                global_id: GlobalId::new(RecordKind::Container, 9),
                patch: FieldsPatch::name("Ghost"),
            },
            RecordUpdate {
                global_id: GlobalId::new(RecordKind::Container, 2),
                patch: FieldsPatch::name("x"),
            },
        ];

        let report = inv.bulk_update(&updates);

        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.summary(), "Updated 1 record(s); 2 failed.");
        assert_eq!(
            report.details(),
            vec![
                "IC9 was not found.".to_string(),
                "IC2: Name must be at least 2 characters.".to_string(),
            ]
        );

        let stored = inv
            .records(&[
                GlobalId::new(RecordKind::Container, 1),
                GlobalId::new(RecordKind::Container, 2),
            ])
            .unwrap();
        assert_eq!(stored[0].fields.name, "Freezer box");
        assert_eq!(stored[1].fields.name, "Box B");
    }

    #[test]
    fn open_and_persist_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("inventory.json");
        export_records(&path, &[record(RecordKind::Sample, 2, "Tris", "")]).unwrap();

        let inv = LocalInventory::default();
        assert_eq!(inv.open(&path).unwrap(), 1);

        inv.bulk_update(&[RecordUpdate {
            global_id: GlobalId::new(RecordKind::Sample, 2),
            patch: FieldsPatch::description("pH 8"),
        }]);

        let reread = parse_inventory(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread[0].fields.description, "pH 8");
    }

    #[test]
    fn index_suffixed_batch_rename_fits_past_nine_records() {
        use crate::logic::owner::{BatchCollection, FieldOwner};
        use crate::logic::validation::NAME_MAX_LENGTH;
        use crate::models::fields::FieldName;

        let boxes: Vec<Record> = (1..=10)
            .map(|n| record(RecordKind::Container, n, &format!("Box {n}"), ""))
            .collect();
        let inv = LocalInventory::from_records(boxes.clone());

        let suffix = NameSuffix::IndexNumber;
        let base = "n".repeat(suffix.max_name_length());
        let mut batch = BatchCollection::new(boxes).unwrap();
        batch.set_field_editable(FieldName::Name, true);
        batch.set_fields_dirty(&FieldsPatch::name(&base)).unwrap();

        let report = inv.bulk_update(&batch.submission(suffix));
        assert_eq!(report.failed_count(), 0, "{:?}", report.details());

        let stored = inv.records(&[GlobalId::new(RecordKind::Container, 10)]).unwrap();
        assert!(stored[0].fields.name.ends_with(".10"));
        assert_eq!(stored[0].fields.name.chars().count(), NAME_MAX_LENGTH);
    }

    #[test]
    fn parse_rejects_duplicate_ids() {
        let json = r#"{"records":[
            {"global_id":"SA1","name":"One","created":"2025-01-01T00:00:00Z"},
            {"global_id":"SA1","name":"Two","created":"2025-01-01T00:00:00Z"}
        ]}"#;
        let err = parse_inventory(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate record id"));
    }

    #[test]
    fn export_name_uses_query() {
        assert_eq!(suggested_export_name("Freezer Boxes"), "freezer_boxes.json");
        assert_eq!(suggested_export_name("  "), "inventory_export.json");
    }
}
