//! Report Viewer Widget
//! Right side scrollable panel previewing the commentary placed on each slide.

use crate::commentary::RowCommentary;
use crate::generator::{GenerationReport, SlideCommentary};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 10.0;

/// Scrollable per-slide preview of the last generation run.
#[derive(Default)]
pub struct ReportViewer {
    pub report: Option<GenerationReport>,
}

impl ReportViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.report = None;
    }

    pub fn set_report(&mut self, report: GenerationReport) {
        self.report = Some(report);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(report) = &self.report else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Output Yet").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!(
                        "{}: {} text boxes, {} charts",
                        report.variant.label(),
                        report.text_boxes_added(),
                        report.charts.len()
                    ))
                    .size(16.0)
                    .strong(),
                );

                if !report.dropped_indices.is_empty() {
                    ui.label(
                        RichText::new(format!(
                            "Skipped slide indices: {:?}",
                            report.dropped_indices
                        ))
                        .color(Color32::from_rgb(243, 156, 18)),
                    );
                }
                if report.unpaired_rows > 0 {
                    ui.label(
                        RichText::new(format!(
                            "{} data rows had no slide to go on",
                            report.unpaired_rows
                        ))
                        .color(Color32::GRAY),
                    );
                }
                ui.add_space(CARD_SPACING);

                for slide in &report.slides {
                    Self::draw_slide_card(ui, slide);
                    ui.add_space(CARD_SPACING);
                }

                if !report.charts.is_empty() {
                    ui.separator();
                    ui.label(RichText::new("Charts").size(14.0).strong());
                    for chart in &report.charts {
                        ui.label(format!(
                            "Slide {}: {} chart, {} categories ({})",
                            chart.slide_index,
                            chart.kind.label(),
                            chart.categories,
                            chart.part
                        ));
                    }
                }
            });
    }

    fn draw_slide_card(ui: &mut egui::Ui, slide: &SlideCommentary) {
        let border_color = if slide.inserted() {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::from_rgb(220, 53, 69)
        };

        egui::Frame::none()
            .stroke(egui::Stroke::new(1.5, border_color))
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new(format!(
                        "Slide {} · sheet row {}",
                        slide.slide_index, slide.sheet_row
                    ))
                    .strong(),
                );
                match &slide.commentary {
                    RowCommentary::Text(text) => {
                        ui.label(text);
                    }
                    RowCommentary::Omitted(reason) => {
                        ui.label(
                            RichText::new(format!("No commentary: {}", reason))
                                .color(border_color),
                        );
                    }
                }
            });
    }
}
