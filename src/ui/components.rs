//! Reusable UI components
//!
//! Form rows and output boxes shared by all four tabs.

use crate::theme;
use crate::types::TextOutput;
use eframe::egui;

/// Dim uppercase section heading
pub fn section_label(ui: &mut egui::Ui, text: &str) {
    ui.add(
        egui::Label::new(
            egui::RichText::new(text)
                .color(theme::TEXT_DIM)
                .size(theme::FONT_SMALL),
        )
        .selectable(false),
    );
}

/// Grid row: label + single-line text input. Must be called inside a 2-column grid.
pub fn text_row(ui: &mut egui::Ui, label: &str, value: &mut String) -> egui::Response {
    row_label(ui, label);
    let response = ui.add(
        egui::TextEdit::singleline(value)
            .desired_width(theme::FORM_WIDTH - theme::LABEL_WIDTH),
    );
    ui.end_row();
    response
}

/// Grid row: label + drop-down over fixed string options
pub fn choice_row(ui: &mut egui::Ui, label: &str, value: &mut String, options: &[&str]) {
    row_label(ui, label);
    egui::ComboBox::from_id_salt(label)
        .selected_text(value.as_str())
        .width(theme::FORM_WIDTH - theme::LABEL_WIDTH)
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, option.to_string(), *option);
            }
        });
    ui.end_row();
}

fn row_label(ui: &mut egui::Ui, label: &str) {
    ui.add_sized(
        [theme::LABEL_WIDTH, 20.0],
        egui::Label::new(
            egui::RichText::new(label)
                .color(theme::TEXT_MUTED)
                .size(theme::FONT_LABEL),
        )
        .selectable(false),
    );
}

/// Multi-line input filling the available width
pub fn text_area(ui: &mut egui::Ui, value: &mut String, hint: &str, rows: usize) -> egui::Response {
    ui.add(
        egui::TextEdit::multiline(value)
            .hint_text(hint)
            .desired_rows(rows)
            .desired_width(f32::INFINITY),
    )
}

/// Read-only result box with a copy button. Failures are drawn in red.
pub fn output_box(ui: &mut egui::Ui, output: &TextOutput) {
    let text = output.text.as_str();
    theme::section_frame().show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.horizontal(|ui| {
            section_label(ui, "OUTPUT");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let copy = ui.add_enabled(
                    !text.is_empty(),
                    egui::Button::new(
                        egui::RichText::new(egui_phosphor::regular::COPY).size(theme::FONT_BODY),
                    )
                    .frame(false),
                );
                if copy.on_hover_text("Copy to clipboard").clicked() {
                    ui.ctx().copy_text(text.to_string());
                }
            });
        });
        ui.add_space(theme::SPACING_SM);

        let color = if output.failed {
            theme::STATUS_ERROR
        } else {
            theme::TEXT_SECONDARY
        };
        ui.add(
            egui::Label::new(egui::RichText::new(text).color(color).size(theme::FONT_BODY))
                .wrap()
                .selectable(true),
        );
    });
}
