// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring component state, messages, and commands.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::logic::inventory::{AdditionalInfo, BulkReport, Inventory, export_records};
use crate::logic::owner::{RecordUpdate, owner_for_selection};
use crate::logic::search::{ResultsPage, SearchParams, SearchTicket};
use crate::models::record::{GlobalId, Record, RecordKind};
use crate::ui::components::record_form::{self, FormCommand, FormModel, FormMsg};
use crate::ui::components::search::{self, SearchCommand, SearchModel, SearchMsg};
use crate::utils::Preferences;

/// Outcome notification for a bulk operation, with per-item details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub details: Vec<String>,
    pub is_error: bool,
}

/// Top-level application state.
#[derive(Default)]
pub struct AppModel {
    /// Search panel state.
    pub search: SearchModel,
    /// Currently mounted edit form, if any.
    pub form: Option<FormModel>,
    /// Last id handed to a form; bulk replies carry it back.
    pub next_form_id: u64,
    /// Additional info fetched per record.
    pub info: HashMap<GlobalId, AdditionalInfo>,
    /// Records with an additional-info request in flight.
    pub fetching_info: HashSet<GlobalId>,
    /// Bumped on every inventory open; info replies from older ones are dropped.
    pub inventory_generation: u64,
    pub prefs: Preferences,
    /// Where preferences are written; `None` disables persistence.
    pub prefs_path: Option<PathBuf>,
    /// Inventory file currently open.
    pub inventory_path: Option<PathBuf>,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    pub toast: Option<Toast>,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

/// Application messages routed through the update function.
#[derive(Debug)]
pub enum Msg {
    Search(SearchMsg),
    Form(FormMsg),
    OpenInventoryRequested,
    InventoryOpened(Result<(PathBuf, usize), String>),
    InventoryOpenCancelled,
    EditorLoaded(Result<Vec<Record>, String>),
    FetchAdditionalInfo(GlobalId),
    AdditionalInfoLoaded {
        id: GlobalId,
        generation: u64,
        result: Result<AdditionalInfo, String>,
    },
    BulkCompleted {
        form: u64,
        report: BulkReport,
    },
    ExportCompleted(Result<(PathBuf, usize), String>),
    ExportCancelled,
    PreferencesSaved(Result<(), String>),
    DismissError,
    DismissToast,
}

/// Commands represent side-effects executed between frames.
#[derive(Debug)]
pub enum Command {
    PickInventoryFile,
    OpenInventory(PathBuf),
    Search {
        ticket: SearchTicket,
        params: SearchParams,
    },
    LoadForEditing(Vec<GlobalId>),
    FetchAdditionalInfo {
        id: GlobalId,
        generation: u64,
    },
    BulkUpdate {
        form: u64,
        updates: Vec<RecordUpdate>,
    },
    ExportRecords {
        ids: Vec<GlobalId>,
        suggested_name: String,
    },
    SavePreferences {
        path: PathBuf,
        prefs: Preferences,
    },
}

/// Startup commands: reopen the last inventory when one is remembered.
pub fn init(model: &mut AppModel, cmds: &mut Vec<Command>) {
    if let Some(path) = model.prefs.last_inventory.clone() {
        cmds.push(Command::OpenInventory(path));
    }
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Search(m) => {
            let mut search_cmds = Vec::new();
            if let Some(event) = search::update(&mut model.search, m, &mut search_cmds) {
                surface_event(model, event.message, event.is_error);
            }
            for c in search_cmds {
                match c {
                    SearchCommand::Run { ticket, params } => {
                        cmds.push(Command::Search { ticket, params })
                    }
                    SearchCommand::OpenEditor(ids) => cmds.push(Command::LoadForEditing(ids)),
                    SearchCommand::Export {
                        ids,
                        suggested_name,
                    } => cmds.push(Command::ExportRecords {
                        ids,
                        suggested_name,
                    }),
                    SearchCommand::FetchInfo(id) => request_info(model, id, cmds),
                    SearchCommand::PageSizeChosen(size) => {
                        model.prefs.page_size = size;
                        save_preferences(model, cmds);
                    }
                }
            }
        }
        Msg::Form(m) => {
            let Some(form) = model.form.as_mut() else {
                tracing::debug!(msg = ?m, "form message without an open form");
                return;
            };
            let form_id = form.id();
            let mut form_cmds = Vec::new();
            let event = record_form::update(form, m, &mut form_cmds);
            if let Some(event) = event {
                surface_event(model, event.message, event.is_error);
            }
            for c in form_cmds {
                match c {
                    FormCommand::Submit(updates) => cmds.push(Command::BulkUpdate {
                        form: form_id,
                        updates,
                    }),
                    FormCommand::SuffixChosen(suffix) => {
                        model.prefs.name_suffix = suffix;
                        save_preferences(model, cmds);
                    }
                    FormCommand::Close => model.form = None,
                }
            }
        }
        Msg::OpenInventoryRequested => cmds.push(Command::PickInventoryFile),
        Msg::InventoryOpened(result) => match result {
            Ok((path, count)) => {
                model.form = None;
                model.info.clear();
                model.fetching_info.clear();
                model.inventory_generation += 1;
                model.search.search_mut().clear_selection();
                model.inventory_path = Some(path.clone());
                surface_event(
                    model,
                    format!("Opened {} ({count} records).", path.display()),
                    false,
                );
                if model.prefs.last_inventory.as_ref() != Some(&path) {
                    model.prefs.last_inventory = Some(path);
                    save_preferences(model, cmds);
                }
                let params = SearchParams {
                    page_size: model.prefs.page_size,
                    ..Default::default()
                };
                forward_search(model, params, cmds);
            }
            Err(err) => surface_event(model, format!("Failed to open inventory:\n\n{err}"), true),
        },
        Msg::InventoryOpenCancelled => {
            surface_event(model, "Open cancelled.".to_string(), false)
        }
        Msg::EditorLoaded(result) => {
            let opened = result.and_then(|records| {
                let containers: Vec<GlobalId> = records
                    .iter()
                    .filter(|r| r.kind() == RecordKind::Container)
                    .map(|r| r.global_id.clone())
                    .collect();
                let owner = owner_for_selection(records).map_err(|e| e.to_string())?;
                Ok((owner, containers))
            });
            match opened {
                Ok((owner, containers)) => {
                    model.next_form_id += 1;
                    let form = FormModel::new(owner, model.prefs.name_suffix);
                    model.form = Some(form.with_id(model.next_form_id));
                    for id in containers {
                        request_info(model, id, cmds);
                    }
                }
                Err(err) => surface_event(model, format!("Cannot edit selection: {err}"), true),
            }
        }
        Msg::FetchAdditionalInfo(id) => request_info(model, id, cmds),
        Msg::AdditionalInfoLoaded {
            id,
            generation,
            result,
        } => {
            if generation != model.inventory_generation {
                tracing::debug!(%id, "dropping additional info for a closed inventory");
                return;
            }
            model.fetching_info.remove(&id);
            match result {
                Ok(info) => {
                    model.info.insert(id, info);
                }
                Err(err) => {
                    surface_event(model, format!("Failed to load details for {id}: {err}"), false)
                }
            }
        }
        Msg::BulkCompleted { form, report } => on_bulk_completed(model, form, report, cmds),
        Msg::ExportCompleted(result) => match result {
            Ok((path, count)) => surface_event(
                model,
                format!("Exported {count} record(s) to {}", path.display()),
                false,
            ),
            Err(err) => surface_event(model, format!("Failed to export records:\n\n{err}"), true),
        },
        Msg::ExportCancelled => surface_event(model, "Export cancelled.".to_string(), false),
        Msg::PreferencesSaved(result) => {
            if let Err(err) = result {
                surface_event(model, format!("Preferences not saved: {err}"), false);
            }
        }
        Msg::DismissError => model.error = None,
        Msg::DismissToast => model.toast = None,
    }
}

/// Execute a command against `inventory` and return the resulting message.
pub fn run_command(cmd: Command, inventory: &dyn Inventory) -> Msg {
    tracing::debug!(command = ?cmd, "running command");
    match cmd {
        Command::PickInventoryFile => {
            let file = rfd::FileDialog::new()
                .set_title("Open inventory")
                .add_filter("JSON", &["json"])
                .pick_file();
            match file {
                Some(path) => open_inventory(inventory, path),
                None => Msg::InventoryOpenCancelled,
            }
        }
        Command::OpenInventory(path) => open_inventory(inventory, path),
        Command::Search { ticket, params } => {
            let result: Result<ResultsPage, String> =
                inventory.search(&params).map_err(|e| e.to_string());
            Msg::Search(SearchMsg::Completed { ticket, result })
        }
        Command::LoadForEditing(ids) => {
            Msg::EditorLoaded(inventory.records(&ids).map_err(|e| e.to_string()))
        }
        Command::FetchAdditionalInfo { id, generation } => {
            let result = inventory.additional_info(&id).map_err(|e| e.to_string());
            Msg::AdditionalInfoLoaded {
                id,
                generation,
                result,
            }
        }
        Command::BulkUpdate { form, updates } => Msg::BulkCompleted {
            form,
            report: inventory.bulk_update(&updates),
        },
        Command::ExportRecords {
            ids,
            suggested_name,
        } => {
            let file = rfd::FileDialog::new()
                .set_title("Export records")
                .add_filter("JSON", &["json"])
                .set_file_name(&suggested_name)
                .save_file();
            match file {
                Some(path) => Msg::ExportCompleted(export_to(inventory, &ids, path)),
                None => Msg::ExportCancelled,
            }
        }
        Command::SavePreferences { path, prefs } => {
            let result = prefs.save(&path).map_err(|e| {
                tracing::warn!(error = %e, "failed to save preferences");
                e.to_string()
            });
            Msg::PreferencesSaved(result)
        }
    }
}

fn open_inventory(inventory: &dyn Inventory, path: PathBuf) -> Msg {
    let result = inventory
        .open(&path)
        .map(|count| (path, count))
        .map_err(|e| {
            tracing::error!(error = %e, "failed to open inventory");
            format!("{e:#}")
        });
    Msg::InventoryOpened(result)
}

fn export_to(
    inventory: &dyn Inventory,
    ids: &[GlobalId],
    path: PathBuf,
) -> Result<(PathBuf, usize), String> {
    let records = inventory.records(ids).map_err(|e| e.to_string())?;
    export_records(&path, &records).map_err(|e| format!("{e:#}"))?;
    tracing::info!(path = %path.display(), count = records.len(), "records exported");
    Ok((path, records.len()))
}

/// Queue an additional-info fetch unless one is already in flight for `id`.
fn request_info(model: &mut AppModel, id: GlobalId, cmds: &mut Vec<Command>) {
    if model.fetching_info.insert(id.clone()) {
        cmds.push(Command::FetchAdditionalInfo {
            id,
            generation: model.inventory_generation,
        });
    } else {
        tracing::debug!(%id, "additional info already requested");
    }
}

fn forward_search(model: &mut AppModel, params: SearchParams, cmds: &mut Vec<Command>) {
    let mut search_cmds = Vec::new();
    search::run(&mut model.search, params, &mut search_cmds);
    for c in search_cmds {
        if let SearchCommand::Run { ticket, params } = c {
            cmds.push(Command::Search { ticket, params });
        }
    }
}

/// Apply a bulk reply; only the form that submitted it is settled or closed.
fn on_bulk_completed(
    model: &mut AppModel,
    form_id: u64,
    report: BulkReport,
    cmds: &mut Vec<Command>,
) {
    let updated = report.updated();
    model.search.search_mut().refresh_records(&updated);
    let failed = report.failed_count();

    match model.form.as_mut() {
        Some(form) if form.id() == form_id => {
            form.finish_submit();
            if failed == 0 {
                model.form = None;
            }
        }
        _ => tracing::debug!(form = form_id, "bulk reply for a form that is no longer open"),
    }

    model.status = Some(report.summary());
    model.toast = Some(Toast {
        message: report.summary(),
        details: report.details(),
        is_error: failed > 0,
    });

    if !updated.is_empty() {
        let params = model.search.search().params().clone();
        forward_search(model, params, cmds);
    }
}

fn save_preferences(model: &AppModel, cmds: &mut Vec<Command>) {
    if let Some(path) = model.prefs_path.clone() {
        cmds.push(Command::SavePreferences {
            path,
            prefs: model.prefs.clone(),
        });
    }
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::inventory::{BulkOutcome, InventoryError, LocalInventory, parse_inventory};
    use crate::logic::owner::tests::record;
    use crate::models::fields::FieldName;
    use tempfile::TempDir;

    fn boxes() -> LocalInventory {
        LocalInventory::from_records(vec![
            record(RecordKind::Container, 1, "Box A", "Stored at room temp"),
            record(RecordKind::Container, 2, "Box B", "Stored at room temp"),
            record(RecordKind::Sample, 1, "Buffer", ""),
        ])
    }

    /// Run queued commands until the model settles.
    fn drain(model: &mut AppModel, mut cmds: Vec<Command>, inventory: &dyn Inventory) {
        while let Some(cmd) = cmds.pop() {
            let msg = run_command(cmd, inventory);
            update(model, msg, &mut cmds);
        }
    }

    fn send(model: &mut AppModel, msg: Msg, inventory: &dyn Inventory) {
        let mut cmds = Vec::new();
        update(model, msg, &mut cmds);
        drain(model, cmds, inventory);
    }

    #[test]
    fn batch_rename_end_to_end() {
        let inv = boxes();
        let mut model = AppModel::default();

        send(&mut model, Msg::Search(SearchMsg::QueryChanged("box".into())), &inv);
        assert_eq!(model.search.search().results().len(), 2);

        send(&mut model, Msg::Search(SearchMsg::SelectPage), &inv);
        send(&mut model, Msg::Search(SearchMsg::EditSelected), &inv);

        let form = model.form.as_ref().expect("form opened");
        assert!(form.owner().can_choose_which_to_edit());
        assert!(form.owner().field_values().name.is_mixed());
        assert_eq!(model.info.len(), 2, "container details fetched");
        assert!(model.fetching_info.is_empty());

        for m in [
            FormMsg::SetEditable {
                field: FieldName::Name,
                editable: true,
            },
            FormMsg::NameChanged("Freezer box".into()),
            FormMsg::SubmitRequested,
        ] {
            send(&mut model, Msg::Form(m), &inv);
        }

        assert!(model.form.is_none(), "form closes on full success");
        let toast = model.toast.as_ref().unwrap();
        assert!(!toast.is_error);
        assert_eq!(toast.message, "Updated 2 record(s).");

        let stored = inv
            .records(&[
                GlobalId::new(RecordKind::Container, 1),
                GlobalId::new(RecordKind::Container, 2),
            ])
            .unwrap();
        assert!(stored.iter().all(|r| r.fields.name == "Freezer box"));
        assert!(
            stored
                .iter()
                .all(|r| r.fields.description == "Stored at room temp")
        );
    }

    #[test]
    fn additional_info_requests_are_deduplicated() {
        let mut model = AppModel::default();
        let id = GlobalId::new(RecordKind::Container, 1);
        let mut cmds = Vec::new();

        update(&mut model, Msg::FetchAdditionalInfo(id.clone()), &mut cmds);
        update(
            &mut model,
            Msg::Search(SearchMsg::ShowInfo(id.clone())),
            &mut cmds,
        );
        assert_eq!(cmds.len(), 1);

        let msg = run_command(cmds.remove(0), &boxes());
        update(&mut model, msg, &mut cmds);
        assert!(model.info.contains_key(&id));

        update(&mut model, Msg::FetchAdditionalInfo(id), &mut cmds);
        assert_eq!(cmds.len(), 1, "a new request is allowed once the first lands");
    }

    #[test]
    fn info_in_flight_is_forgotten_when_inventory_changes() {
        let inv = boxes();
        let mut model = AppModel::default();
        let id = GlobalId::new(RecordKind::Container, 1);
        let mut held = Vec::new();
        update(&mut model, Msg::FetchAdditionalInfo(id.clone()), &mut held);

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("other.json");
        update(&mut model, Msg::InventoryOpened(Ok((path, 0))), &mut Vec::new());
        assert!(model.fetching_info.is_empty());

        let mut cmds = Vec::new();
        update(&mut model, Msg::FetchAdditionalInfo(id.clone()), &mut cmds);
        assert_eq!(cmds.len(), 1, "the new inventory may ask again");

        let old_reply = run_command(held.remove(0), &inv);
        update(&mut model, old_reply, &mut cmds);
        assert!(model.info.is_empty(), "old details are not shown");
        assert!(model.fetching_info.contains(&id), "new request still pending");

        let new_reply = run_command(cmds.remove(0), &inv);
        update(&mut model, new_reply, &mut cmds);
        assert!(model.info.contains_key(&id));
        assert!(model.fetching_info.is_empty());
    }

    #[test]
    fn stale_search_results_are_dropped() {
        let inv = boxes();
        let mut model = AppModel::default();
        let mut cmds = Vec::new();

        update(&mut model, Msg::Search(SearchMsg::QueryChanged("buf".into())), &mut cmds);
        update(&mut model, Msg::Search(SearchMsg::QueryChanged("box".into())), &mut cmds);
        let newest = cmds.pop().unwrap();
        let oldest = cmds.pop().unwrap();

        let msg = run_command(newest, &inv);
        update(&mut model, msg, &mut cmds);
        let msg = run_command(oldest, &inv);
        update(&mut model, msg, &mut cmds);

        let names: Vec<&str> = model
            .search
            .search()
            .results()
            .iter()
            .map(|r| r.fields.name.as_str())
            .collect();
        assert_eq!(names, ["Box A", "Box B"]);
    }

    #[test]
    fn partial_bulk_failure_keeps_form_open() {
        let inv = boxes();
        let mut model = AppModel::default();
        let records = inv.records(&[GlobalId::new(RecordKind::Container, 1)]);
        send(
            &mut model,
            Msg::EditorLoaded(records.map_err(|e| e.to_string())),
            &inv,
        );
        assert!(model.form.is_some());

        let report = BulkReport {
            outcomes: vec![BulkOutcome {
                global_id: GlobalId::new(RecordKind::Container, 1),
                result: Err(InventoryError::NotFound(GlobalId::new(RecordKind::Container, 1))),
            }],
        };
        let form = model.form.as_ref().map(FormModel::id).unwrap();
        let mut cmds = Vec::new();
        update(&mut model, Msg::BulkCompleted { form, report }, &mut cmds);

        assert!(model.form.is_some());
        let toast = model.toast.as_ref().unwrap();
        assert!(toast.is_error);
        assert_eq!(toast.details, vec!["IC1 was not found.".to_string()]);
        assert!(cmds.is_empty());
    }

    #[test]
    fn late_bulk_reply_leaves_newer_form_open() {
        let inv = boxes();
        let mut model = AppModel::default();
        let sample = GlobalId::new(RecordKind::Sample, 1);
        let other_box = GlobalId::new(RecordKind::Container, 2);

        let records = inv.records(&[sample.clone()]).map_err(|e| e.to_string());
        send(&mut model, Msg::EditorLoaded(records), &inv);
        send(&mut model, Msg::Form(FormMsg::DescriptionChanged("pH 7".into())), &inv);

        let mut held = Vec::new();
        update(&mut model, Msg::Form(FormMsg::SubmitRequested), &mut held);
        assert!(matches!(held.as_slice(), [Command::BulkUpdate { .. }]));

        send(&mut model, Msg::Form(FormMsg::Close), &inv);
        assert!(model.form.is_some(), "close waits for the save");

        // Open another record before the first save is answered.
        let records = inv.records(&[other_box.clone()]).map_err(|e| e.to_string());
        send(&mut model, Msg::EditorLoaded(records), &inv);
        send(&mut model, Msg::Form(FormMsg::DescriptionChanged("Shelf 3".into())), &inv);

        let reply = run_command(held.remove(0), &inv);
        update(&mut model, reply, &mut held);

        let form = model.form.as_ref().expect("newer form survives");
        assert_eq!(form.owner().records()[0].global_id, other_box);
        assert!(form.owner().is_dirty(), "edits are kept");
        assert!(!form.is_submitting());
        assert_eq!(model.toast.as_ref().unwrap().message, "Updated 1 record(s).");
        assert_eq!(inv.records(&[sample]).unwrap()[0].fields.description, "pH 7");

        drain(&mut model, held, &inv);
        send(&mut model, Msg::Form(FormMsg::SubmitRequested), &inv);
        assert!(model.form.is_none());
        assert_eq!(
            inv.records(&[other_box]).unwrap()[0].fields.description,
            "Shelf 3"
        );
    }

    #[test]
    fn mixed_kind_selection_surfaces_error() {
        let inv = boxes();
        let mut model = AppModel::default();
        let records = inv
            .records(&[
                GlobalId::new(RecordKind::Container, 1),
                GlobalId::new(RecordKind::Sample, 1),
            ])
            .unwrap();

        send(&mut model, Msg::EditorLoaded(Ok(records)), &inv);

        assert!(model.form.is_none());
        assert!(model.error.as_deref().unwrap().starts_with("Cannot edit selection"));
    }

    #[test]
    fn opening_inventory_remembers_path_and_searches() {
        let tmp = TempDir::new().unwrap();
        let inv_path = tmp.path().join("inventory.json");
        export_records(&inv_path, &[record(RecordKind::Sample, 4, "Tris", "")]).unwrap();
        let prefs_path = tmp.path().join("prefs").join("preferences.json");

        let inv = LocalInventory::default();
        let mut model = AppModel {
            prefs_path: Some(prefs_path.clone()),
            prefs: Preferences {
                last_inventory: Some(inv_path.clone()),
                page_size: 25,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut cmds = Vec::new();
        init(&mut model, &mut cmds);
        drain(&mut model, cmds, &inv);

        assert_eq!(model.inventory_path.as_deref(), Some(inv_path.as_path()));
        assert_eq!(model.search.search().params().page_size, 25);
        assert_eq!(model.search.search().results().len(), 1);
        assert!(model.error.is_none());

        send(&mut model, Msg::Search(SearchMsg::PageSizeChanged(5)), &inv);
        assert_eq!(Preferences::load(&prefs_path).unwrap().page_size, 5);
    }

    #[test]
    fn bulk_update_persists_through_single_record_form() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("inventory.json");
        export_records(&path, &[record(RecordKind::Sample, 2, "Tris", "")]).unwrap();
        let inv = LocalInventory::default();
        let mut model = AppModel::default();
        send(&mut model, Msg::Search(SearchMsg::Refresh), &inv);
        assert!(model.search.search().results().is_empty());
        let count = inv.open(&path).unwrap();
        send(&mut model, Msg::InventoryOpened(Ok((path.clone(), count))), &inv);

        send(
            &mut model,
            Msg::Search(SearchMsg::SetSelected {
                id: GlobalId::new(RecordKind::Sample, 2),
                selected: true,
            }),
            &inv,
        );
        send(&mut model, Msg::Search(SearchMsg::EditSelected), &inv);
        assert!(!model.form.as_ref().unwrap().owner().can_choose_which_to_edit());

        send(&mut model, Msg::Form(FormMsg::DescriptionChanged("pH 8".into())), &inv);
        send(&mut model, Msg::Form(FormMsg::SubmitRequested), &inv);

        let reread = parse_inventory(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread[0].fields.description, "pH 8");
        assert_eq!(model.search.search().results()[0].fields.description, "pH 8");
    }
}
