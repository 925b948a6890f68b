// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Record editing form bound to a [`FieldOwner`].
//!
//! The same form edits one record or a whole selection. In batch mode every
//! field carries a "choose to edit" checkbox and starts unchecked; unchecked
//! fields keep whatever was typed but are left out of the submission.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use eframe::egui;

use crate::logic::errors::{ErrorMap, FormSection};
use crate::logic::inventory::AdditionalInfo;
use crate::logic::owner::{FieldOwner, RecordUpdate};
use crate::logic::validation::{NameSuffix, validate_description, validate_name, validate_tags};
use crate::models::fields::{FieldName, FieldsPatch};
use crate::models::record::{GlobalId, RecordKind, SharingMode};
use crate::models::tags::Tags;
use crate::ui::components::tags::{self, TagsModel, TagsMsg};

/// State of one mounted form. Dropped when the form closes.
pub struct FormModel {
    owner: Box<dyn FieldOwner>,
    errors: ErrorMap,
    helper_text: BTreeMap<FieldName, String>,
    touched: BTreeSet<FieldName>,
    name_suffix: NameSuffix,
    tags: TagsModel,
    submitting: bool,
    /// Identifies this form instance across background round trips.
    id: u64,
}

/// Messages produced by the form view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMsg {
    NameChanged(String),
    NameBlurred,
    DescriptionChanged(String),
    SharingChanged(SharingMode),
    SetEditable { field: FieldName, editable: bool },
    SuffixChanged(NameSuffix),
    Tags(TagsMsg),
    Revert,
    SubmitRequested,
    Close,
}

/// Side effects requested by the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormCommand {
    Submit(Vec<RecordUpdate>),
    SuffixChosen(NameSuffix),
    Close,
}

/// Feedback surfaced to the status bar/modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormEvent {
    pub message: String,
    pub is_error: bool,
}

impl FormModel {
    pub fn new(owner: Box<dyn FieldOwner>, name_suffix: NameSuffix) -> Self {
        let mut model = Self {
            owner,
            errors: ErrorMap::default(),
            helper_text: BTreeMap::new(),
            touched: BTreeSet::new(),
            name_suffix,
            tags: TagsModel::default(),
            submitting: false,
            id: 0,
        };
        revalidate(&mut model);
        model
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> &dyn FieldOwner {
        self.owner.as_ref()
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn helper_text(&self, field: FieldName) -> Option<&str> {
        self.helper_text.get(&field).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Suffix in effect; single records never get one.
    pub fn effective_suffix(&self) -> NameSuffix {
        if self.owner.can_choose_which_to_edit() {
            self.name_suffix
        } else {
            NameSuffix::None
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting
            && self.errors.is_valid()
            && !self.owner.submission(self.effective_suffix()).is_empty()
    }

    /// Called when the bulk update for this form has been answered.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

/// Apply a message to the form.
pub fn update(
    model: &mut FormModel,
    msg: FormMsg,
    cmds: &mut Vec<FormCommand>,
) -> Option<FormEvent> {
    let event = match msg {
        FormMsg::NameChanged(name) => {
            model.touched.insert(FieldName::Name);
            set_dirty(model, FieldsPatch::name(name))
        }
        FormMsg::NameBlurred => {
            model.touched.insert(FieldName::Name);
            None
        }
        FormMsg::DescriptionChanged(text) => set_dirty(model, FieldsPatch::description(text)),
        FormMsg::SharingChanged(mode) => set_dirty(model, FieldsPatch::sharing_mode(mode)),
        FormMsg::SetEditable { field, editable } => {
            model.owner.set_field_editable(field, editable);
            None
        }
        FormMsg::SuffixChanged(suffix) => {
            model.name_suffix = suffix;
            cmds.push(FormCommand::SuffixChosen(suffix));
            None
        }
        FormMsg::Tags(m) => {
            let mut current = model
                .owner
                .field_values()
                .tags
                .value()
                .cloned()
                .unwrap_or_default();
            let event = tags::update(&mut model.tags, &mut current, m);
            let changed = model.owner.field_values().tags.value() != Some(&current);
            let dirty_event = if changed {
                set_dirty(model, FieldsPatch::tags(current))
            } else {
                None
            };
            dirty_event.or(event.map(|e| FormEvent {
                message: e.message,
                is_error: e.is_error,
            }))
        }
        FormMsg::Revert => {
            if model.submitting {
                None
            } else {
                model.owner.discard_changes();
                model.touched.clear();
                Some(FormEvent {
                    message: "Changes discarded.".into(),
                    is_error: false,
                })
            }
        }
        FormMsg::SubmitRequested => submit(model, cmds),
        FormMsg::Close => {
            // Closing mid-save would drop the reply's outcome.
            if !model.submitting {
                cmds.push(FormCommand::Close);
            }
            None
        }
    };
    revalidate(model);
    event
}

fn set_dirty(model: &mut FormModel, patch: FieldsPatch) -> Option<FormEvent> {
    match model.owner.set_fields_dirty(&patch) {
        Ok(_) => None,
        Err(err) => Some(FormEvent {
            message: err.to_string(),
            is_error: true,
        }),
    }
}

fn submit(model: &mut FormModel, cmds: &mut Vec<FormCommand>) -> Option<FormEvent> {
    if model.submitting {
        return None;
    }
    if !model.errors.is_valid() {
        return Some(FormEvent {
            message: "Please fix the highlighted fields before saving.".into(),
            is_error: true,
        });
    }
    let updates = model.owner.submission(model.effective_suffix());
    if updates.is_empty() {
        return Some(FormEvent {
            message: "Nothing to save.".into(),
            is_error: false,
        });
    }
    tracing::info!(records = updates.len(), "submitting record updates");
    model.submitting = true;
    cmds.push(FormCommand::Submit(updates));
    Some(FormEvent {
        message: "Saving…".into(),
        is_error: false,
    })
}

/// Re-run every field rule and report each result to the error map.
///
/// Mixed values and fields not chosen for editing are never flagged.
fn revalidate(model: &mut FormModel) {
    let owner = model.owner.as_ref();
    let values = owner.field_values();
    let suffix = model.effective_suffix();
    let name_touched = model.touched.contains(&FieldName::Name);

    for field in FieldName::ALL {
        let error = if owner.is_field_editable(field) {
            match field {
                FieldName::Name => values
                    .name
                    .value()
                    .and_then(|n| validate_name(n, name_touched, suffix)),
                FieldName::Description => {
                    values.description.value().and_then(|d| validate_description(d))
                }
                FieldName::Tags => values.tags.value().and_then(validate_tags),
                FieldName::SharingMode => None,
            }
        } else {
            None
        };

        model
            .errors
            .on_error_state_change(FormSection::of(field), field, error.is_some());
        match error {
            Some(err) => {
                model.helper_text.insert(field, err.to_string());
            }
            None => {
                model.helper_text.remove(&field);
            }
        }
    }
}

/// Render the form and return triggered messages.
pub fn view(
    ui: &mut egui::Ui,
    model: &FormModel,
    info: &HashMap<GlobalId, AdditionalInfo>,
) -> Vec<FormMsg> {
    let mut msgs = Vec::new();
    let owner = model.owner();
    let records = owner.records();

    ui.horizontal(|ui| {
        let title = match records {
            [single] => format!("{} {}", single.kind().label(), single.global_id),
            many => format!("Batch editing {} records", many.len()),
        };
        ui.heading(title);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let close = egui::Button::new(format!("{} Close", egui_phosphor::regular::X));
            if ui
                .add_enabled(!model.is_submitting(), close)
                .on_disabled_hover_text("Saving...")
                .clicked()
            {
                msgs.push(FormMsg::Close);
            }
            let save = egui::Button::new(format!(
                "{} Save",
                egui_phosphor::regular::FLOPPY_DISK
            ));
            if ui
                .add_enabled(model.can_submit(), save)
                .on_disabled_hover_text("Edit a field and fix any errors to save")
                .clicked()
            {
                msgs.push(FormMsg::SubmitRequested);
            }
            let revert = egui::Button::new(format!(
                "{} Revert",
                egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE
            ));
            if ui
                .add_enabled(owner.is_dirty() && !model.is_submitting(), revert)
                .clicked()
            {
                msgs.push(FormMsg::Revert);
            }
            if model.is_submitting() {
                ui.add(egui::Spinner::new().size(14.0));
            }
        });
    });

    if owner.can_choose_which_to_edit() {
        ui.label(
            egui::RichText::new(
                "Tick a field to change it on every selected record. Unticked fields are left untouched.",
            )
            .small()
            .color(egui::Color32::from_gray(110)),
        );
    }
    ui.add_space(8.0);

    render_section(ui, model, FormSection::Overview, &mut msgs, |ui, msgs| {
        render_name(ui, model, msgs);
        ui.add_space(6.0);
        render_description(ui, model, msgs);
    });
    ui.add_space(8.0);
    render_section(ui, model, FormSection::Details, &mut msgs, |ui, msgs| {
        render_tags(ui, model, msgs);
        ui.add_space(6.0);
        render_sharing(ui, model, msgs);
    });

    render_locations(ui, model, info);
    msgs
}

fn render_section(
    ui: &mut egui::Ui,
    model: &FormModel,
    section: FormSection,
    msgs: &mut Vec<FormMsg>,
    body: impl FnOnce(&mut egui::Ui, &mut Vec<FormMsg>),
) {
    let mut title = egui::RichText::new(section.label());
    if model.errors().section_has_error(section) {
        title = title.color(ui.visuals().error_fg_color);
    }
    egui::CollapsingHeader::new(title)
        .id_salt(section.label())
        .default_open(true)
        .show(ui, |ui| body(ui, msgs));
}

/// Label row with the batch "choose to edit" checkbox; returns whether inputs are enabled.
fn field_header(
    ui: &mut egui::Ui,
    model: &FormModel,
    field: FieldName,
    msgs: &mut Vec<FormMsg>,
) -> bool {
    let owner = model.owner();
    let mut editable = owner.is_field_editable(field);
    ui.horizontal(|ui| {
        if owner.can_choose_which_to_edit()
            && ui
                .checkbox(&mut editable, "")
                .on_hover_text(format!("Change {} on all selected records", field.label()))
                .changed()
        {
            msgs.push(FormMsg::SetEditable { field, editable });
        }
        let mut label = egui::RichText::new(field.label());
        if model.errors().field_has_error(field) {
            label = label.color(ui.visuals().error_fg_color);
        }
        ui.label(label);
        if owner.dirty_fields().contains(&field) {
            ui.label(
                egui::RichText::new("edited")
                    .small()
                    .color(egui::Color32::from_gray(120)),
            );
        }
    });
    editable
}

fn helper(ui: &mut egui::Ui, model: &FormModel, field: FieldName) {
    if let Some(text) = model.helper_text(field) {
        ui.label(
            egui::RichText::new(text)
                .small()
                .color(ui.visuals().error_fg_color),
        );
    }
}

fn render_name(ui: &mut egui::Ui, model: &FormModel, msgs: &mut Vec<FormMsg>) {
    let enabled = field_header(ui, model, FieldName::Name, msgs);
    let owner = model.owner();
    let mut name = owner
        .field_values()
        .name
        .value()
        .cloned()
        .unwrap_or_default();
    let hint = owner.no_value_label(FieldName::Name).unwrap_or("Name");

    ui.horizontal(|ui| {
        let resp = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(&mut name).hint_text(hint),
        );
        if resp.changed() {
            msgs.push(FormMsg::NameChanged(name));
        }
        if resp.lost_focus() {
            msgs.push(FormMsg::NameBlurred);
        }

        if owner.can_choose_which_to_edit() {
            let mut suffix = model.name_suffix;
            ui.add_enabled_ui(enabled, |ui| {
                egui::ComboBox::from_id_salt("name-suffix")
                    .selected_text(suffix.label())
                    .show_ui(ui, |ui| {
                        for option in NameSuffix::ALL {
                            if ui
                                .selectable_value(&mut suffix, option, option.label())
                                .clicked()
                            {
                                msgs.push(FormMsg::SuffixChanged(option));
                            }
                        }
                    });
            });
        }
    });
    helper(ui, model, FieldName::Name);
}

fn render_description(ui: &mut egui::Ui, model: &FormModel, msgs: &mut Vec<FormMsg>) {
    let enabled = field_header(ui, model, FieldName::Description, msgs);
    let owner = model.owner();
    let mut text = owner
        .field_values()
        .description
        .value()
        .cloned()
        .unwrap_or_default();
    let hint = owner
        .no_value_label(FieldName::Description)
        .unwrap_or("Description");

    let resp = ui.add_enabled(
        enabled,
        egui::TextEdit::multiline(&mut text)
            .hint_text(hint)
            .desired_rows(3),
    );
    if resp.changed() {
        msgs.push(FormMsg::DescriptionChanged(text));
    }
    helper(ui, model, FieldName::Description);
}

fn render_tags(ui: &mut egui::Ui, model: &FormModel, msgs: &mut Vec<FormMsg>) {
    let enabled = field_header(ui, model, FieldName::Tags, msgs);
    let owner = model.owner();
    let values = owner.field_values();
    let current = values.tags.value().cloned().unwrap_or_else(Tags::default);
    let placeholder = owner.no_value_label(FieldName::Tags);

    let tag_msgs = tags::view(ui, &model.tags, &current, enabled, placeholder);
    msgs.extend(tag_msgs.into_iter().map(FormMsg::Tags));
    helper(ui, model, FieldName::Tags);
}

fn render_sharing(ui: &mut egui::Ui, model: &FormModel, msgs: &mut Vec<FormMsg>) {
    let enabled = field_header(ui, model, FieldName::SharingMode, msgs);
    let owner = model.owner();
    let current = owner.field_values().sharing_mode.value().copied();

    ui.add_enabled_ui(enabled, |ui| {
        ui.horizontal(|ui| {
            for mode in SharingMode::ALL {
                let button = egui::Button::new(mode.label()).selected(current == Some(mode));
                if ui.add(button).clicked() && current != Some(mode) {
                    msgs.push(FormMsg::SharingChanged(mode));
                }
            }
            if let Some(label) = owner.no_value_label(FieldName::SharingMode) {
                ui.label(
                    egui::RichText::new(label)
                        .italics()
                        .color(egui::Color32::from_gray(110)),
                );
            }
        });
    });
}

/// Free storage slots for containers whose details have been fetched.
fn render_locations(
    ui: &mut egui::Ui,
    model: &FormModel,
    info: &HashMap<GlobalId, AdditionalInfo>,
) {
    let containers: Vec<_> = model
        .owner()
        .records()
        .iter()
        .filter(|r| r.kind() == RecordKind::Container)
        .collect();
    if containers.is_empty() {
        return;
    }

    ui.add_space(8.0);
    egui::CollapsingHeader::new("Locations")
        .default_open(containers.len() == 1)
        .show(ui, |ui| {
            for record in containers {
                let text = match info.get(&record.global_id) {
                    Some(details) => match details.free_locations() {
                        Some(free) => format!("{}: {free} free location(s)", record.global_id),
                        None => format!("{}: no storage slots", record.global_id),
                    },
                    None => format!("{}: loading…", record.global_id),
                };
                ui.label(text);
            }
        });
}
