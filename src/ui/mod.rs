// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for browsing and editing the inventory.
//! Handles layout and wiring between views, the MVU kernel and the worker pool.

pub mod components;

use std::sync::Arc;

use eframe::egui;

use crate::logic::inventory::LocalInventory;
use crate::mvu::{self, AppModel, Command, Msg};
use crate::ui::components::{record_form, search};
use crate::utils::{Preferences, prefs};

/// Stateful egui application for searching and batch-editing records.
pub struct LabInvApp {
    model: AppModel,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
}

impl LabInvApp {
    /// Load preferences, start the worker pool and queue startup commands.
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();
        let inventory = Arc::new(LocalInventory::default());

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2);
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            let inventory = Arc::clone(&inventory);
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd, inventory.as_ref());
                    let _ = msg_tx.send(msg);
                }
            });
        }

        let prefs_path = prefs::default_path();
        let mut status = None;
        let prefs = match prefs_path.as_deref().map(Preferences::load) {
            Some(Ok(prefs)) => prefs,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "preferences unreadable; using defaults");
                status = Some(format!("Preferences ignored: {err}"));
                Preferences::default()
            }
            None => Preferences::default(),
        };

        let mut app = Self {
            model: AppModel {
                prefs,
                prefs_path,
                status,
                ..Default::default()
            },
            inbox: Vec::new(),
            cmd_tx,
            msg_rx,
        };

        let mut commands = Vec::new();
        mvu::init(&mut app.model, &mut commands);
        app.dispatch(commands);
        app
    }

    fn dispatch(&mut self, commands: Vec<Command>) {
        for cmd in commands {
            if self.cmd_tx.send(cmd).is_ok() {
                self.model.pending_commands += 1;
            }
        }
    }
}

impl Default for LabInvApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for LabInvApp {
    /// Required by eframe 0.34; all rendering happens in `update`, which the
    /// runtime still invokes immediately before this method each frame.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    /// Drives a single UI frame: drains worker replies, runs the reducer over
    /// queued messages in arrival order, then renders every panel.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_spacing(ctx);

        // Pull messages produced by the command workers.
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
        }

        for msg in std::mem::take(&mut self.inbox) {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            self.dispatch(commands);
        }

        if self.model.pending_commands > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Inventory");
                if let Some(path) = &self.model.inventory_path {
                    ui.label(
                        egui::RichText::new(path.display().to_string())
                            .small()
                            .color(egui::Color32::from_gray(110)),
                    );
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_theme_controls(ui);
                    ui.separator();
                    self.render_open_button(ui);
                });
            });
            ui.add_space(4.0);
        });

        self.render_error_modal(ctx);
        self.render_toast(ctx);

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::SidePanel::left("search_panel")
            .resizable(true)
            .default_width(460.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                let msgs = search::view(ui, &self.model.search);
                self.inbox.extend(msgs.into_iter().map(Msg::Search));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            egui::ScrollArea::vertical().show(ui, |ui| match &self.model.form {
                Some(form) => {
                    let msgs = record_form::view(ui, form, &self.model.info);
                    self.inbox.extend(msgs.into_iter().map(Msg::Form));
                }
                None => {
                    ui.label(
                        egui::RichText::new("Select one or more records and choose Edit.")
                            .italics()
                            .color(egui::Color32::from_gray(110)),
                    );
                }
            });
        });
    }
}

impl LabInvApp {
    fn ensure_spacing(&self, ctx: &egui::Context) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        });
    }

    fn render_theme_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(2.0);
        egui::widgets::global_theme_preference_switch(ui);
    }

    fn render_open_button(&mut self, ui: &mut egui::Ui) {
        let button = egui::Button::new(format!(
            "{} Open inventory",
            egui_phosphor::regular::FOLDER_OPEN
        ));
        if ui.add(button).clicked() {
            self.inbox.push(Msg::OpenInventoryRequested);
        }
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }

    /// Bulk-operation outcome in the bottom-right corner, with failed items listed.
    fn render_toast(&mut self, ctx: &egui::Context) {
        let Some(toast) = self.model.toast.clone() else {
            return;
        };
        let icon = if toast.is_error {
            egui_phosphor::regular::WARNING
        } else {
            egui_phosphor::regular::CHECK_CIRCLE
        };
        egui::Window::new("bulk_toast")
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -36.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("{icon} {}", toast.message));
                    if ui.small_button(egui_phosphor::regular::X).clicked() {
                        self.inbox.push(Msg::DismissToast);
                    }
                });
                if !toast.details.is_empty() {
                    egui::CollapsingHeader::new("Details")
                        .default_open(true)
                        .show(ui, |ui| {
                            for line in &toast.details {
                                ui.label(
                                    egui::RichText::new(line)
                                        .small()
                                        .color(egui::Color32::from_rgb(192, 64, 64)),
                                );
                            }
                        });
                }
            });
    }

    /// Render latest status message when present.
    fn render_status(&self, ui: &mut egui::Ui) {
        if let Some(text) = &self.model.status {
            let display = if self.model.pending_commands > 0 {
                format!("{}  ({} working…)", text, self.model.pending_commands)
            } else {
                text.to_string()
            };
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(display).color(egui::Color32::from_gray(68)));
                if self.model.pending_commands > 0 {
                    ui.add(egui::Spinner::new().size(14.0))
                        .on_hover_text(format!(
                            "{} task(s) running in background",
                            self.model.pending_commands
                        ));
                }
            });
        }
    }
}
