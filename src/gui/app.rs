//! PCA Commentary Main Application
//! Main window with control panel and report preview.

use crate::config::GeneratorConfig;
use crate::generator::{generate_to_file, parse_slide_indices};
use crate::gui::{ControlPanel, ControlPanelAction, ReportViewer};
use crate::ppt::Deck;
use egui::SidePanel;
use tracing::{error, info};

/// Main application window.
pub struct PcaApp {
    config: GeneratorConfig,
    control_panel: ControlPanel,
    report_viewer: ReportViewer,
}

impl PcaApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: GeneratorConfig) -> Self {
        let mut control_panel = ControlPanel::new();
        control_panel.settings.variant = config.variant;
        Self {
            config,
            control_panel,
            report_viewer: ReportViewer::new(),
        }
    }

    fn handle_browse_template(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PowerPoint", &["pptx"])
            .pick_file()
        {
            self.control_panel.settings.template_path = Some(path);
            self.control_panel.set_progress(0.0, "Template selected");
        }
    }

    fn handle_browse_dataset(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "ods", "csv"])
            .pick_file()
        {
            self.control_panel.settings.dataset_path = Some(path);
            self.control_panel.set_progress(0.0, "Dataset selected");
        }
    }

    /// Run generation inline, then save where the user chooses
    fn handle_generate(&mut self) {
        let settings = self.control_panel.settings.clone();
        let (Some(template), Some(dataset)) = (settings.template_path, settings.dataset_path)
        else {
            self.control_panel
                .set_progress(0.0, "Error: choose a template and a dataset first");
            return;
        };

        let slide_indices = parse_slide_indices(&settings.slides_text);
        let config = self.config.clone().with_variant(settings.variant);

        // Ask user for output location
        let output_path = match rfd::FileDialog::new()
            .add_filter("PowerPoint", &["pptx"])
            .set_file_name(config.variant.output_file_name())
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        self.report_viewer.clear();
        self.control_panel.output_path = None;
        self.control_panel.set_progress(20.0, "Reading template...");

        let deck = match Deck::open(&template) {
            Ok(deck) => deck,
            Err(e) => {
                error!("Failed to open template: {}", e);
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
                return;
            }
        };

        self.control_panel.set_progress(50.0, "Generating commentary...");

        match generate_to_file(deck, &dataset, &slide_indices, &config, &output_path) {
            Ok(report) => {
                info!("Saved {}", output_path.display());
                self.control_panel.set_progress(
                    100.0,
                    &format!(
                        "Complete! {} text boxes, {} charts",
                        report.text_boxes_added(),
                        report.charts.len()
                    ),
                );
                self.control_panel.output_path = Some(output_path);
                self.report_viewer.set_report(report);
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn handle_open_output(&mut self) {
        if let Some(path) = &self.control_panel.output_path {
            if let Err(e) = open::that(path) {
                self.control_panel
                    .set_progress(100.0, &format!("Error opening file: {}", e));
            }
        }
    }
}

impl eframe::App for PcaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseTemplate => self.handle_browse_template(),
                        ControlPanelAction::BrowseDataset => self.handle_browse_dataset(),
                        ControlPanelAction::Generate => self.handle_generate(),
                        ControlPanelAction::OpenOutput => self.handle_open_output(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Report preview
        egui::CentralPanel::default().show(ctx, |ui| {
            self.report_viewer.show(ui);
        });
    }
}
