// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Tag chips editor in MVU shape. The tag list itself lives in the form's field owner.

use eframe::egui;

use crate::models::tags::Tags;

/// Transient editor state (modal input, inline edit buffer).
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct TagsModel {
    modal_open: bool,
    modal_input: String,
    editing_index: Option<usize>,
    editing_buffer: String,
}

/// Messages emitted by the tags view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagsMsg {
    OpenModal,
    CloseModal,
    ModalInputChanged(String),
    AddFromModal,
    StartEdit(usize),
    EditInputChanged(String),
    CommitEdit,
    CancelEdit,
    Remove(usize),
}

/// Feedback for the status bar or error modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagsEvent {
    pub message: String,
    pub is_error: bool,
}

/// Apply `msg`, editing `tags` in place. Returns a feedback event when relevant.
pub fn update(model: &mut TagsModel, tags: &mut Tags, msg: TagsMsg) -> Option<TagsEvent> {
    match msg {
        TagsMsg::OpenModal => {
            model.modal_open = true;
            model.modal_input.clear();
            None
        }
        TagsMsg::CloseModal => {
            model.modal_open = false;
            model.modal_input.clear();
            None
        }
        TagsMsg::ModalInputChanged(text) => {
            model.modal_input = text;
            None
        }
        TagsMsg::AddFromModal => {
            let (message, added_any) = add_from_input(&model.modal_input, tags);
            if added_any {
                model.modal_open = false;
                model.modal_input.clear();
            }
            Some(TagsEvent {
                message,
                is_error: false,
            })
        }
        TagsMsg::StartEdit(index) => {
            model.editing_index = Some(index);
            model.editing_buffer = tags.items().get(index).cloned().unwrap_or_default();
            None
        }
        TagsMsg::EditInputChanged(text) => {
            model.editing_buffer = text;
            None
        }
        TagsMsg::CommitEdit => commit_edit(model, tags),
        TagsMsg::CancelEdit => {
            model.editing_index = None;
            model.editing_buffer.clear();
            None
        }
        TagsMsg::Remove(index) => {
            tags.remove(index)?;
            if model.editing_index == Some(index) {
                model.editing_index = None;
                model.editing_buffer.clear();
            }
            Some(TagsEvent {
                message: "Tag removed".to_string(),
                is_error: false,
            })
        }
    }
}

/// Render the tag chips. `placeholder` replaces the chips when the batch disagrees.
pub fn view(
    ui: &mut egui::Ui,
    model: &TagsModel,
    tags: &Tags,
    enabled: bool,
    placeholder: Option<&str>,
) -> Vec<TagsMsg> {
    let mut msgs = Vec::new();

    ui.add_enabled_ui(enabled, |ui| {
        ui.horizontal_wrapped(|ui| {
            if let Some(text) = placeholder {
                ui.label(
                    egui::RichText::new(text)
                        .italics()
                        .color(egui::Color32::from_gray(110)),
                );
            } else if tags.is_empty() {
                ui.label(
                    egui::RichText::new("No tags yet.")
                        .italics()
                        .color(egui::Color32::from_gray(110)),
                );
            }

            for (i, tag) in tags.items().iter().enumerate() {
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        if model.editing_index == Some(i) {
                            render_editing_tag(ui, model, &mut msgs);
                        } else {
                            render_tag_chip(ui, i, tag, &mut msgs);
                        }
                    });
                });
            }

            if ui
                .button(format!("{} Add tag(s)", egui_phosphor::regular::PLUS))
                .clicked()
            {
                msgs.push(TagsMsg::OpenModal);
            }
        });
    });

    if model.modal_open {
        render_modal(ui.ctx(), model, &mut msgs);
    }

    msgs
}

fn render_tag_chip(ui: &mut egui::Ui, index: usize, tag: &str, msgs: &mut Vec<TagsMsg>) {
    if ui.add(egui::Button::new(tag).wrap()).clicked() {
        msgs.push(TagsMsg::StartEdit(index));
    }
    if ui
        .button(
            egui::RichText::new(egui_phosphor::regular::X).color(egui::Color32::from_gray(140)),
        )
        .on_hover_text("Remove tag")
        .clicked()
    {
        msgs.push(TagsMsg::Remove(index));
    }
}

fn render_editing_tag(ui: &mut egui::Ui, model: &TagsModel, msgs: &mut Vec<TagsMsg>) {
    let mut buffer = model.editing_buffer.clone();
    let response = ui.add(egui::TextEdit::singleline(&mut buffer).desired_width(120.0));
    if response.changed() {
        msgs.push(TagsMsg::EditInputChanged(buffer));
    }
    if response.lost_focus() && ui.input(|inp| inp.key_pressed(egui::Key::Enter)) {
        msgs.push(TagsMsg::CommitEdit);
        return;
    }
    if ui.button(egui_phosphor::regular::CHECK).clicked() {
        msgs.push(TagsMsg::CommitEdit);
    }
    if ui.button(egui_phosphor::regular::X).clicked() {
        msgs.push(TagsMsg::CancelEdit);
    }
}

fn render_modal(ctx: &egui::Context, model: &TagsModel, msgs: &mut Vec<TagsMsg>) {
    let mut input = model.modal_input.clone();

    egui::Window::new("Add tag(s)")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            let resp = ui.add(
                egui::TextEdit::singleline(&mut input).hint_text("e.g., frozen, buffer"),
            );
            if resp.changed() {
                msgs.push(TagsMsg::ModalInputChanged(input.clone()));
            }
            if resp.lost_focus() && ui.input(|inp| inp.key_pressed(egui::Key::Enter)) {
                msgs.push(TagsMsg::AddFromModal);
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Add").clicked() {
                    msgs.push(TagsMsg::AddFromModal);
                }
                if ui.button("Cancel").clicked() {
                    msgs.push(TagsMsg::CloseModal);
                }
            });
        });
}

/// Add comma-separated input to `tags`; returns a status message and whether anything was added.
fn add_from_input(input: &str, tags: &mut Tags) -> (String, bool) {
    let mut added = 0usize;
    let mut skipped = 0usize;
    for part in input.split(',') {
        if tags.push(part) {
            added += 1;
        } else {
            skipped += 1;
        }
    }

    let message = match (added, skipped) {
        (0, _) => "No tags added; skipped duplicates or empty entries.".to_string(),
        (a, 0) => format!("Added {a} tag(s)."),
        (a, s) => format!("Added {a} tag(s); skipped {s}."),
    };
    (message, added > 0)
}

fn commit_edit(model: &mut TagsModel, tags: &mut Tags) -> Option<TagsEvent> {
    let index = model.editing_index?;
    let new_tag = model.editing_buffer.trim();
    if new_tag.is_empty() {
        return Some(TagsEvent {
            message: "Tag cannot be empty.".into(),
            is_error: true,
        });
    }

    let duplicate = tags
        .items()
        .iter()
        .enumerate()
        .any(|(i, existing)| i != index && existing.eq_ignore_ascii_case(new_tag));
    if duplicate {
        return Some(TagsEvent {
            message: "Tag already exists.".into(),
            is_error: true,
        });
    }

    let mut items = tags.items().to_vec();
    if let Some(slot) = items.get_mut(index) {
        *slot = new_tag.to_string();
    }
    *tags = Tags::new(items);
    model.editing_index = None;
    model.editing_buffer.clear();
    None
}
