use eframe::egui::{self, RichText};

use super::common::{rgb_of, UiColors};

/// Something the user asked for in the config bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Reset,
    Export,
    Import,
    BackgroundColor([u8; 3]),
}

/// Top bar that hides itself after a period without pointer or key activity.
#[derive(Debug, Clone)]
pub struct ConfigBar {
    auto_hide_secs: f64,
    last_activity: f64,
}

impl ConfigBar {
    pub fn new(auto_hide_secs: f32) -> Self {
        Self {
            auto_hide_secs: f64::from(auto_hide_secs),
            last_activity: 0.0,
        }
    }

    /// Marks user activity at `now` (seconds since app start)
    pub fn touch(&mut self, now: f64) {
        self.last_activity = now;
    }

    pub fn is_visible(&self, now: f64) -> bool {
        now - self.last_activity < self.auto_hide_secs
    }

    /// Seconds until the bar hides, if it is showing
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.is_visible(now)
            .then(|| self.auto_hide_secs - (now - self.last_activity))
    }

    pub fn show(
        &self,
        ui: &mut egui::Ui,
        background: egui::Color32,
        status: Option<&str>,
    ) -> Option<ConfigAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            if ui.button("Reset").on_hover_text("Ctrl+Shift+R").clicked() {
                action = Some(ConfigAction::Reset);
            }
            if ui.button("Export").clicked() {
                action = Some(ConfigAction::Export);
            }
            if ui.button("Import").clicked() {
                action = Some(ConfigAction::Import);
            }

            ui.separator();
            ui.label("Background");
            let mut rgb = rgb_of(background);
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                action = Some(ConfigAction::BackgroundColor(rgb));
            }

            if let Some(status) = status {
                ui.separator();
                ui.label(RichText::new(status).color(UiColors::LABEL));
            }
        });

        action
    }
}
