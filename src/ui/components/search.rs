// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Search panel: query, paging, result table and selection.

use eframe::egui;

use crate::logic::search::{PAGE_SIZES, ResultsPage, Search, SearchParams, SearchTicket};
use crate::models::record::{GlobalId, RecordKind};

/// UI state for the search panel.
#[derive(Clone, Debug, Default)]
pub struct SearchModel {
    search: Search,
    query_input: String,
}

/// Messages produced by the search view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchMsg {
    QueryChanged(String),
    KindChanged(Option<RecordKind>),
    PageChanged(usize),
    PageSizeChanged(usize),
    Refresh,
    Completed {
        ticket: SearchTicket,
        result: Result<ResultsPage, String>,
    },
    SetSelected { id: GlobalId, selected: bool },
    SelectPage,
    ClearSelection,
    EditSelected,
    ExportSelected,
    ShowInfo(GlobalId),
}

/// Side effects requested by the search panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchCommand {
    Run {
        ticket: SearchTicket,
        params: SearchParams,
    },
    OpenEditor(Vec<GlobalId>),
    Export {
        ids: Vec<GlobalId>,
        suggested_name: String,
    },
    FetchInfo(GlobalId),
    PageSizeChosen(usize),
}

/// Feedback surfaced to the status bar/modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchEvent {
    pub message: String,
    pub is_error: bool,
}

impl SearchModel {
    pub fn search(&self) -> &Search {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut Search {
        &mut self.search
    }

    fn selected_ids(&self) -> Vec<GlobalId> {
        self.search.selection().iter().cloned().collect()
    }
}

/// Issue a search with `params` and queue the request.
pub fn run(model: &mut SearchModel, params: SearchParams, cmds: &mut Vec<SearchCommand>) {
    let ticket = model.search.begin(params.clone());
    cmds.push(SearchCommand::Run { ticket, params });
}

/// Apply a message to the search model.
pub fn update(
    model: &mut SearchModel,
    msg: SearchMsg,
    cmds: &mut Vec<SearchCommand>,
) -> Option<SearchEvent> {
    let current = model.search.params().clone();
    match msg {
        SearchMsg::QueryChanged(query) => {
            model.query_input = query.clone();
            let params = SearchParams {
                query,
                page: 0,
                ..current
            };
            run(model, params, cmds);
            None
        }
        SearchMsg::KindChanged(kind) => {
            let params = SearchParams {
                kind,
                page: 0,
                ..current
            };
            run(model, params, cmds);
            None
        }
        SearchMsg::PageChanged(page) => {
            let page = page.min(model.search.page_count().saturating_sub(1));
            run(model, SearchParams { page, ..current }, cmds);
            None
        }
        SearchMsg::PageSizeChanged(page_size) => {
            if !PAGE_SIZES.contains(&page_size) {
                return None;
            }
            cmds.push(SearchCommand::PageSizeChosen(page_size));
            let params = SearchParams {
                page_size,
                page: 0,
                ..current
            };
            run(model, params, cmds);
            None
        }
        SearchMsg::Refresh => {
            run(model, current, cmds);
            None
        }
        SearchMsg::Completed { ticket, result } => match result {
            Ok(page) => {
                model.search.complete(ticket, page);
                None
            }
            Err(err) => model.search.fail(ticket).then(|| SearchEvent {
                message: format!("Search failed: {err}"),
                is_error: true,
            }),
        },
        SearchMsg::SetSelected { id, selected } => {
            model.search.set_selected(id, selected);
            None
        }
        SearchMsg::SelectPage => {
            model.search.select_page();
            None
        }
        SearchMsg::ClearSelection => {
            model.search.clear_selection();
            None
        }
        SearchMsg::EditSelected => {
            let ids = model.selected_ids();
            if ids.is_empty() {
                return Some(SearchEvent {
                    message: "Select at least one record to edit.".into(),
                    is_error: false,
                });
            }
            cmds.push(SearchCommand::OpenEditor(ids));
            None
        }
        SearchMsg::ExportSelected => {
            let ids = model.selected_ids();
            if ids.is_empty() {
                return Some(SearchEvent {
                    message: "Select at least one record to export.".into(),
                    is_error: false,
                });
            }
            let suggested_name =
                crate::logic::inventory::suggested_export_name(&current.query);
            cmds.push(SearchCommand::Export {
                ids,
                suggested_name,
            });
            None
        }
        SearchMsg::ShowInfo(id) => {
            cmds.push(SearchCommand::FetchInfo(id));
            None
        }
    }
}

/// Render the search panel and return triggered messages.
pub fn view(ui: &mut egui::Ui, model: &SearchModel) -> Vec<SearchMsg> {
    let mut msgs = Vec::new();
    let search = &model.search;
    let params = search.params();

    ui.horizontal(|ui| {
        let mut query = model.query_input.clone();
        let hint = format!(
            "{} Search name, tag, id…",
            egui_phosphor::regular::MAGNIFYING_GLASS
        );
        if ui
            .add(
                egui::TextEdit::singleline(&mut query)
                    .hint_text(hint)
                    .desired_width(220.0),
            )
            .changed()
        {
            msgs.push(SearchMsg::QueryChanged(query));
        }

        let mut kind = params.kind;
        egui::ComboBox::from_id_salt("kind-filter")
            .selected_text(kind.map_or("All kinds", |k| k.label()))
            .show_ui(ui, |ui| {
                if ui.selectable_value(&mut kind, None, "All kinds").clicked() {
                    msgs.push(SearchMsg::KindChanged(None));
                }
                for option in RecordKind::ALL {
                    if ui
                        .selectable_value(&mut kind, Some(option), option.label())
                        .clicked()
                    {
                        msgs.push(SearchMsg::KindChanged(Some(option)));
                    }
                }
            });

        if ui
            .button(egui_phosphor::regular::ARROWS_CLOCKWISE)
            .on_hover_text("Refresh")
            .clicked()
        {
            msgs.push(SearchMsg::Refresh);
        }
        if search.is_loading() {
            ui.add(egui::Spinner::new().size(14.0));
        }
    });

    ui.add_space(6.0);
    render_results(ui, search, &mut msgs);
    ui.add_space(6.0);
    render_pager(ui, search, &mut msgs);
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        let selected = search.selection().len();
        ui.label(format!("{selected} selected"));
        if ui.button("Select page").clicked() {
            msgs.push(SearchMsg::SelectPage);
        }
        if ui
            .add_enabled(selected > 0, egui::Button::new("Clear"))
            .clicked()
        {
            msgs.push(SearchMsg::ClearSelection);
        }
        let edit_label = if selected > 1 {
            format!("{} Batch edit", egui_phosphor::regular::PENCIL_SIMPLE)
        } else {
            format!("{} Edit", egui_phosphor::regular::PENCIL_SIMPLE)
        };
        if ui
            .add_enabled(selected > 0, egui::Button::new(edit_label))
            .clicked()
        {
            msgs.push(SearchMsg::EditSelected);
        }
        if ui
            .add_enabled(
                selected > 0,
                egui::Button::new(format!("{} Export", egui_phosphor::regular::EXPORT)),
            )
            .clicked()
        {
            msgs.push(SearchMsg::ExportSelected);
        }
    });

    msgs
}

fn render_results(ui: &mut egui::Ui, search: &Search, msgs: &mut Vec<SearchMsg>) {
    if search.results().is_empty() {
        ui.label(
            egui::RichText::new(if search.is_loading() {
                "Searching…"
            } else {
                "No records found."
            })
            .italics()
            .color(egui::Color32::from_gray(110)),
        );
        return;
    }

    egui::Grid::new("search_results")
        .num_columns(4)
        .striped(true)
        .spacing(egui::vec2(10.0, 6.0))
        .show(ui, |ui| {
            ui.label("");
            ui.strong("Id");
            ui.strong("Name");
            ui.strong("Tags");
            ui.end_row();

            for record in search.results() {
                let id = &record.global_id;
                let mut selected = search.is_selected(id);
                if ui.checkbox(&mut selected, "").changed() {
                    msgs.push(SearchMsg::SetSelected {
                        id: id.clone(),
                        selected,
                    });
                }
                let id_resp = ui
                    .link(id.to_string())
                    .on_hover_text(format!("{}: click for details", record.kind().label()));
                if id_resp.clicked() {
                    msgs.push(SearchMsg::ShowInfo(id.clone()));
                }
                ui.label(&record.fields.name);
                ui.label(
                    egui::RichText::new(record.fields.tags.joined())
                        .small()
                        .color(egui::Color32::from_gray(120)),
                );
                ui.end_row();
            }
        });
}

fn render_pager(ui: &mut egui::Ui, search: &Search, msgs: &mut Vec<SearchMsg>) {
    let params = search.params();
    let pages = search.page_count();

    ui.horizontal(|ui| {
        if ui
            .add_enabled(params.page > 0, egui::Button::new(egui_phosphor::regular::CARET_LEFT))
            .clicked()
        {
            msgs.push(SearchMsg::PageChanged(params.page - 1));
        }
        ui.label(format!(
            "Page {} of {pages} ({} records)",
            params.page + 1,
            search.total()
        ));
        if ui
            .add_enabled(
                params.page + 1 < pages,
                egui::Button::new(egui_phosphor::regular::CARET_RIGHT),
            )
            .clicked()
        {
            msgs.push(SearchMsg::PageChanged(params.page + 1));
        }

        let mut page_size = params.page_size;
        egui::ComboBox::from_id_salt("page-size")
            .width(60.0)
            .selected_text(page_size.to_string())
            .show_ui(ui, |ui| {
                for size in PAGE_SIZES {
                    if ui
                        .selectable_value(&mut page_size, size, size.to_string())
                        .clicked()
                    {
                        msgs.push(SearchMsg::PageSizeChanged(size));
                    }
                }
            });
        ui.label("per page");
    });
}
