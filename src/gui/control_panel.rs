//! Control Panel Widget
//! Left side panel with file pickers, slide selection and the generate button.

use crate::config::ChartVariant;
use egui::{Color32, RichText};
use std::path::{Path, PathBuf};

/// Form inputs for one generation run
#[derive(Clone)]
pub struct UserSettings {
    pub template_path: Option<PathBuf>,
    pub dataset_path: Option<PathBuf>,
    pub slides_text: String,
    pub variant: ChartVariant,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            template_path: None,
            dataset_path: None,
            slides_text: "5,6,7".to_string(),
            variant: ChartVariant::default(),
        }
    }
}

/// Left side control panel with file selection and generation controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub progress: f32,
    pub status: String,
    pub output_path: Option<PathBuf>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            progress: 0.0,
            status: "Ready".to_string(),
            output_path: None,
        }
    }
}

fn file_label(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "No file selected".to_string())
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both inputs chosen
    pub fn can_generate(&self) -> bool {
        self.settings.template_path.is_some() && self.settings.dataset_path.is_some()
    }

    fn file_row(
        ui: &mut egui::Ui,
        path: Option<&Path>,
        on_browse: ControlPanelAction,
        action: &mut ControlPanelAction,
    ) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(file_label(path)).size(12.0).color(
                        if path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            *action = on_browse;
                        }
                    });
                });
            });
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📝 PCA Commentary")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Commentary & chart generator")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Inputs =====
        ui.label(RichText::new("📁 PowerPoint Template").size(14.0).strong());
        ui.add_space(5.0);
        Self::file_row(
            ui,
            self.settings.template_path.as_deref(),
            ControlPanelAction::BrowseTemplate,
            &mut action,
        );

        ui.add_space(10.0);
        ui.label(RichText::new("📊 PCA Dataset").size(14.0).strong());
        ui.add_space(5.0);
        Self::file_row(
            ui,
            self.settings.dataset_path.as_deref(),
            ControlPanelAction::BrowseDataset,
            &mut action,
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Slides & Variant =====
        ui.label(RichText::new("⚙️ Options").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([110.0, 20.0], egui::Label::new("Slide indices:"));
            ui.add(egui::TextEdit::singleline(&mut self.settings.slides_text).desired_width(150.0));
        });
        ui.label(
            RichText::new("Comma-separated, zero-based")
                .size(10.0)
                .color(Color32::GRAY),
        );

        ui.add_space(8.0);
        for variant in [ChartVariant::Inline, ChartVariant::Summary] {
            ui.radio_value(&mut self.settings.variant, variant, variant.label());
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.can_generate(), |ui| {
                let button = egui::Button::new(RichText::new("▶ Generate").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Generate;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.output_path.is_some(), |ui| {
                let open_button = egui::Button::new(RichText::new("📄 Open Result").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(open_button).clicked() {
                    action = ControlPanelAction::OpenOutput;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseTemplate,
    BrowseDataset,
    Generate,
    OpenOutput,
}
