//! Modal dialogs (alert, settings) and the toast overlay

use super::App;
use crate::theme;
use eframe::egui;
use tracing::warn;

const TOAST_SECONDS: f32 = 3.0;

impl App {
    /// Blocking alert for a missing required input. Everything behind the
    /// backdrop is unclickable until it is dismissed.
    pub(crate) fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };

        let modal_area = egui::Modal::default_area(egui::Id::new("alert_modal"))
            .default_width(320.0 + theme::SPACING_XL * 2.0);
        let modal = egui::Modal::new(egui::Id::new("alert_modal"))
            .area(modal_area)
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame());
        let response = modal.show(ctx, |ui| {
            ui.set_min_width(320.0);
            ui.vertical_centered(|ui| {
                ui.add_space(theme::SPACING_SM);
                ui.label(
                    egui::RichText::new(egui_phosphor::regular::WARNING_CIRCLE)
                        .size(32.0)
                        .color(theme::ACCENT),
                );
                ui.add_space(theme::SPACING_MD);
                ui.label(egui::RichText::new(&message).size(theme::FONT_HEADING));
                ui.add_space(theme::SPACING_XL);
                ui.add(theme::button_accent("OK")).clicked()
                    || ui.input(|i| i.key_pressed(egui::Key::Enter))
            })
            .inner
        });

        if response.inner || response.should_close() {
            self.alert = None;
        }
    }

    pub(crate) fn render_settings(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let modal_area = egui::Modal::default_area(egui::Id::new("settings_modal"))
            .default_width(420.0 + theme::SPACING_XL * 2.0);
        let modal = egui::Modal::new(egui::Id::new("settings_modal"))
            .area(modal_area)
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame());
        let response = modal.show(ctx, |ui| {
            ui.set_min_width(420.0);
            ui.set_max_width(420.0);
            ui.label(egui::RichText::new("Settings").size(theme::FONT_HEADING).strong());
            ui.add_space(theme::SPACING_LG);

            crate::ui::components::section_label(ui, "SERVER URL");
            ui.add_space(theme::SPACING_SM);
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.server_url_draft)
                    .hint_text(crate::constants::DEFAULT_SERVER_URL)
                    .desired_width(f32::INFINITY),
            );
            if edit.changed() {
                self.server_url_error = None;
            }
            if let Some(err) = &self.server_url_error {
                ui.label(
                    egui::RichText::new(err)
                        .color(theme::STATUS_ERROR)
                        .size(theme::FONT_LABEL),
                );
            }
            ui.label(
                egui::RichText::new(format!(
                    "Overridden by the {} environment variable when set",
                    crate::constants::SERVER_URL_ENV
                ))
                .color(theme::TEXT_DIM)
                .size(theme::FONT_SMALL),
            );

            ui.add_space(theme::SPACING_XL);
            let mut close = false;
            ui.horizontal(|ui| {
                let logs = ui.add(theme::button(format!(
                    "{}  Open logs",
                    egui_phosphor::regular::FOLDER_OPEN
                )));
                if logs.clicked() {
                    let logs_dir = self.data_dir.join("logs");
                    if let Err(e) = open::that(&logs_dir) {
                        warn!(error = %e, path = %logs_dir.display(), "Failed to open logs folder");
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(theme::button_accent("Apply")).clicked() && self.apply_server_url() {
                        self.save_settings();
                        close = true;
                    }
                    if ui.add(theme::button("Cancel")).clicked() {
                        self.server_url_draft = self.server_url.clone();
                        self.server_url_error = None;
                        close = true;
                    }
                });
            });
            close
        });

        if response.inner || response.should_close() {
            self.show_settings = false;
        }
    }

    pub(crate) fn render_toast(&mut self, ctx: &egui::Context) {
        let (Some(message), Some(start)) = (&self.toast_message, self.toast_start) else {
            return;
        };
        let elapsed = start.elapsed().as_secs_f32();
        if elapsed > TOAST_SECONDS {
            self.toast_message = None;
            self.toast_start = None;
            return;
        }
        let message = message.clone();

        egui::Area::new(egui::Id::new("toast"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                theme::modal_frame()
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(message)
                                .color(theme::TEXT_SECONDARY)
                                .size(theme::FONT_BODY),
                        );
                    });
            });

        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
