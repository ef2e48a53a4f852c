use eframe::egui::{self, vec2, Align2, RichText};

use super::common::UiColors;
use crate::calibration::steps::progress_text;
use crate::calibration::CalibrationStep;

/// Prompt window shown while calibrating. Returns true when Skip was clicked.
pub fn show(ctx: &egui::Context, step: Option<&CalibrationStep>, progress: (usize, usize)) -> bool {
    let (bound, total) = progress;
    let mut skip = false;

    egui::Window::new("Calibration")
        .anchor(Align2::CENTER_BOTTOM, vec2(0.0, -12.0))
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .show(ctx, |ui| {
            if let Some(step) = step {
                ui.label(
                    RichText::new(step.display_name)
                        .strong()
                        .color(UiColors::HIGHLIGHT_STROKE),
                );
                ui.label(step.prompt);
            }

            let fraction = if total == 0 {
                0.0
            } else {
                bound as f32 / total as f32
            };
            ui.add(egui::ProgressBar::new(fraction).text(progress_text(bound)));

            if ui.button("Skip calibration").clicked() {
                skip = true;
            }
        });

    skip
}
