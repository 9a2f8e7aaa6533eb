//! Tab panels (caption, text-to-image, summarize, elaborate)

use super::App;
use crate::constants::*;
use crate::theme;
use crate::types::*;
use crate::ui::components::{choice_row, output_box, section_label, text_area, text_row};
use eframe::egui;

impl App {
    /// Render the visible tab. Hidden tabs are simply not drawn.
    pub(crate) fn render_active_tab(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for tab in Tab::ALL {
                    if !self.is_tab_visible(tab) {
                        continue;
                    }
                    match tab {
                        Tab::Caption => self.render_caption_tab(ui),
                        Tab::Txt2Img => self.render_txt2img_tab(ui),
                        Tab::Summarize => self.render_summarize_tab(ui),
                        Tab::Elaborate => self.render_elaborate_tab(ui),
                    }
                }
            });
    }

    fn render_caption_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_top(|ui| {
            // Left column: image + parameters
            ui.vertical(|ui| {
                ui.set_width(theme::FORM_WIDTH);
                theme::section_frame().show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    section_label(ui, "IMAGE");
                    ui.add_space(theme::SPACING_SM);
                    match &self.caption_preview {
                        Some(uri) => {
                            ui.add(
                                egui::Image::new(uri.clone())
                                    .max_height(theme::PREVIEW_MAX_HEIGHT)
                                    .max_width(ui.available_width())
                                    .corner_radius(theme::RADIUS_DEFAULT),
                            );
                        }
                        None => {
                            ui.label(
                                egui::RichText::new("Drop an image here or browse for one")
                                    .color(theme::TEXT_DIM),
                            );
                        }
                    }
                    ui.add_space(theme::SPACING_MD);
                    ui.horizontal(|ui| {
                        let browse = ui.add(theme::button(format!(
                            "{}  Browse...",
                            egui_phosphor::regular::FOLDER_OPEN
                        )));
                        if browse.clicked() {
                            self.pick_caption_file();
                        }
                        if let Some(name) = self.caption_file.as_ref().and_then(|p| p.file_name()) {
                            ui.label(
                                egui::RichText::new(name.to_string_lossy())
                                    .color(theme::TEXT_MUTED)
                                    .size(theme::FONT_LABEL),
                            );
                        }
                    });
                });

                ui.add_space(theme::SPACING_LG);
                theme::section_frame().show(ui, |ui| {
                    section_label(ui, "PARAMETERS");
                    ui.add_space(theme::SPACING_SM);
                    egui::Grid::new("caption_params")
                        .num_columns(2)
                        .spacing([theme::SPACING_MD, theme::SPACING_MD])
                        .show(ui, |ui| {
                            let p = &mut self.caption;
                            text_row(ui, "Max new tokens", &mut p.max_new_tokens);
                            text_row(ui, "Temperature", &mut p.temperature);
                            text_row(ui, "Top-p", &mut p.top_p);
                            text_row(ui, "Repetition penalty", &mut p.repetition_penalty);
                            text_row(ui, "Beams", &mut p.num_beams);
                            text_row(ui, "Prefix", &mut p.prefix);
                            text_row(ui, "Suffix", &mut p.suffix);
                        });
                });

                ui.add_space(theme::SPACING_LG);
                if ui
                    .add(theme::button_accent(format!(
                        "{}  Generate caption",
                        egui_phosphor::regular::PLAY
                    )))
                    .clicked()
                {
                    self.run_caption();
                }
            });

            ui.add_space(theme::SPACING_XL);
            ui.vertical(|ui| {
                let output = lock(&self.outputs.caption).clone();
                output_box(ui, &output);
            });
        });
    }

    fn render_txt2img_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(theme::FORM_WIDTH);
                theme::section_frame().show(ui, |ui| {
                    section_label(ui, "PROMPT");
                    ui.add_space(theme::SPACING_SM);
                    text_area(ui, &mut self.txt2img.prompt, "A lighthouse at dusk, oil painting", 4);
                    ui.add_space(theme::SPACING_SM);
                    section_label(ui, "NEGATIVE PROMPT");
                    ui.add_space(theme::SPACING_SM);
                    text_area(ui, &mut self.txt2img.negative_prompt, "blurry, low quality", 2);
                });

                ui.add_space(theme::SPACING_LG);
                theme::section_frame().show(ui, |ui| {
                    section_label(ui, "PARAMETERS");
                    ui.add_space(theme::SPACING_SM);
                    egui::Grid::new("txt2img_params")
                        .num_columns(2)
                        .spacing([theme::SPACING_MD, theme::SPACING_MD])
                        .show(ui, |ui| {
                            let p = &mut self.txt2img;
                            choice_row(ui, "Style", &mut p.style, STYLES);
                            text_row(ui, "Steps", &mut p.steps);
                            text_row(ui, "Guidance", &mut p.guidance);
                            text_row(ui, "Width", &mut p.width);
                            text_row(ui, "Height", &mut p.height);
                            text_row(ui, "Seed", &mut p.seed)
                                .on_hover_text("Leave empty for a random seed");
                        });
                });

                ui.add_space(theme::SPACING_LG);
                if ui
                    .add(theme::button_accent(format!(
                        "{}  Generate image",
                        egui_phosphor::regular::MAGIC_WAND
                    )))
                    .clicked()
                {
                    self.run_txt2img();
                }
            });

            ui.add_space(theme::SPACING_XL);
            ui.vertical(|ui| {
                let status = lock(&self.outputs.txt2img).status.clone();
                output_box(ui, &status);
                ui.add_space(theme::SPACING_LG);

                let has_image = lock(&self.outputs.txt2img).image_src.is_some();
                match self.generated_image() {
                    Some((generation, bytes)) => {
                        let source = egui::load::Bytes::Shared(bytes);
                        ui.add(
                            egui::Image::from_bytes(generation_uri(generation), source)
                            .max_width(ui.available_width())
                            .corner_radius(theme::RADIUS_LARGE),
                        );
                        ui.add_space(theme::SPACING_MD);
                        let save = ui.add(theme::button(format!(
                            "{}  Save PNG...",
                            egui_phosphor::regular::FLOPPY_DISK
                        )));
                        if save.clicked() {
                            self.save_generated_image();
                        }
                    }
                    None if has_image => {
                        ui.label(
                            egui::RichText::new("The server returned an image that could not be decoded")
                                .color(theme::STATUS_ERROR),
                        );
                    }
                    None => {}
                }
            });
        });
    }

    fn render_summarize_tab(&mut self, ui: &mut egui::Ui) {
        theme::section_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            section_label(ui, "TEXT");
            ui.add_space(theme::SPACING_SM);
            text_area(ui, &mut self.summarize.text, "Paste the text to summarize", 10);
            ui.add_space(theme::SPACING_MD);
            egui::Grid::new("summarize_params")
                .num_columns(2)
                .spacing([theme::SPACING_MD, theme::SPACING_MD])
                .show(ui, |ui| {
                    text_row(ui, "Min length", &mut self.summarize.min_length);
                    text_row(ui, "Max length", &mut self.summarize.max_length);
                });
        });

        ui.add_space(theme::SPACING_LG);
        if ui
            .add(theme::button_accent(format!(
                "{}  Summarize",
                egui_phosphor::regular::LIST_BULLETS
            )))
            .clicked()
        {
            self.run_summarize();
        }

        ui.add_space(theme::SPACING_LG);
        let output = lock(&self.outputs.summary).clone();
        output_box(ui, &output);
    }

    fn render_elaborate_tab(&mut self, ui: &mut egui::Ui) {
        theme::section_frame().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            section_label(ui, "TEXT");
            ui.add_space(theme::SPACING_SM);
            text_area(ui, &mut self.elaborate.text, "Write a few sentences to expand", 6);
            ui.add_space(theme::SPACING_MD);
            egui::Grid::new("elaborate_params")
                .num_columns(2)
                .spacing([theme::SPACING_MD, theme::SPACING_MD])
                .show(ui, |ui| {
                    let p = &mut self.elaborate;
                    choice_row(ui, "Tone", &mut p.tone, TONES);
                    choice_row(ui, "Length", &mut p.length, LENGTHS);
                    text_row(ui, "Creativity", &mut p.creativity);
                });
        });

        ui.add_space(theme::SPACING_LG);
        if ui
            .add(theme::button_accent(format!(
                "{}  Elaborate",
                egui_phosphor::regular::TEXT_AA
            )))
            .clicked()
        {
            self.run_elaborate();
        }

        ui.add_space(theme::SPACING_LG);
        let output = lock(&self.outputs.elaboration).clone();
        output_box(ui, &output);
    }
}
