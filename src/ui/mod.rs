//! # Overlay User Interface
//!
//! eframe front end of the overlay. Every frame polls the gamepad source, hands
//! the reading to the [`OverlayController`] and paints whatever the controller
//! reported through [`OverlayView`], its [`OverlaySink`].
//!
//! ## Layout
//! - **Top Panel**: config bar with Reset, Export, Import and the background
//!   colour picker. Hides itself after a few seconds without pointer or key
//!   activity so the overlay stays clean for capture.
//! - **Central Panel**: controller schematic and the cat's paws, filled with
//!   the chosen background colour for chroma keying.
//! - **Calibration Window**: prompt, progress bar and Skip button while a
//!   calibration run is active.
//!
//! ## Frame Pacing
//! With a gamepad connected the app repaints continuously. Without one it
//! only wakes up every `idle_poll_ms` to look for a device.
//!
//! ## Keyboard
//! `Ctrl+Shift+R` forgets the stored calibration and starts a new run.

pub mod calibration_panel;
pub mod common;
pub mod config_bar;
pub mod schematic;

use color_eyre::eyre::{Result, WrapErr};
use eframe::egui::{self, Color32, Context, Event, Key};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use crate::calibration::steps::progress_text;
use crate::config::UiSettings;
use crate::controller::{FrameMonitor, GamepadSource};
use crate::mapping::store::format_hex_color;
use crate::overlay::{CalibrationOutcome, OverlayController, OverlaySink};
use crate::visualization::VisualState;

use self::common::{color_from_hex, panel_frame};
use self::config_bar::{ConfigAction, ConfigBar};

/// What the UI shows, as last reported by the overlay controller.
#[derive(Debug, Clone, Default)]
pub struct OverlayView {
    pub visual: VisualState,
    /// One-line status for the config bar
    pub status: Option<String>,
}

impl OverlaySink for OverlayView {
    fn on_calibration_step_advance(
        &mut self,
        step_index: usize,
        _total_steps: usize,
        display_name: &str,
    ) {
        self.status = Some(format!(
            "{} mapped, {}",
            display_name,
            progress_text(step_index)
        ));
    }

    fn on_visual_state_changed(&mut self, state: &VisualState) {
        self.visual = state.clone();
    }

    fn on_calibration_started(&mut self) {
        self.visual = VisualState::default();
        self.status = Some("Calibration started".to_string());
    }

    fn on_calibration_finished(&mut self, outcome: CalibrationOutcome) {
        self.visual = VisualState::default();
        self.status = Some(
            match outcome {
                CalibrationOutcome::Completed => "Calibration complete",
                CalibrationOutcome::Skipped => "Calibration skipped",
            }
            .to_string(),
        );
    }
}

pub struct OverlayApp {
    controller: OverlayController,
    source: Box<dyn GamepadSource>,
    view: OverlayView,
    config_bar: ConfigBar,
    frames: FrameMonitor,
    background: Color32,
    idle_poll: Duration,
    export_path: PathBuf,
    import_path: PathBuf,
}

impl OverlayApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        controller: OverlayController,
        source: Box<dyn GamepadSource>,
        settings: &UiSettings,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let background = color_from_hex(&controller.background_color());
        let mut view = OverlayView::default();
        if controller.is_calibrating() {
            view.status = Some("Calibration started".to_string());
        }

        Self {
            controller,
            source,
            view,
            config_bar: ConfigBar::new(settings.auto_hide_secs),
            frames: FrameMonitor::new(),
            background,
            idle_poll: Duration::from_millis(settings.idle_poll_ms),
            export_path: settings.export_path.clone(),
            import_path: settings.import_path.clone(),
        }
    }

    fn handle_action(&mut self, action: ConfigAction) {
        match action {
            ConfigAction::Reset => {
                info!("Calibration reset requested");
                self.controller.reset_calibration(&mut self.view);
            }
            ConfigAction::Export => match self.export() {
                Ok(path) => self.view.status = Some(format!("Exported to {}", path.display())),
                Err(e) => {
                    error!("Export failed: {:?}", e);
                    self.view.status = Some(format!("Export failed: {}", e));
                }
            },
            ConfigAction::Import => match self.import() {
                Ok(path) => self.view.status = Some(format!("Imported {}", path.display())),
                Err(e) => {
                    error!("Import failed: {:?}", e);
                    self.view.status = Some(format!("Import failed: {}", e));
                }
            },
            ConfigAction::BackgroundColor(rgb) => {
                self.background = Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
                if let Err(e) = self
                    .controller
                    .set_background_color(&format_hex_color(rgb))
                {
                    error!("Failed to store background colour: {}", e);
                }
            }
        }
    }

    fn export(&self) -> Result<PathBuf> {
        let document = self.controller.export_document()?;
        if let Some(parent) = self.export_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("creating {}", parent.display()))?;
            }
        }
        fs::write(&self.export_path, document)
            .wrap_err_with(|| format!("writing {}", self.export_path.display()))?;
        info!("Exported configuration to {}", self.export_path.display());
        Ok(self.export_path.clone())
    }

    fn import(&mut self) -> Result<PathBuf> {
        let text = fs::read_to_string(&self.import_path)
            .wrap_err_with(|| format!("reading {}", self.import_path.display()))?;
        let outcome = self.controller.import_document(&text, &mut self.view)?;
        if let Some(color) = outcome.background_color {
            self.background = color_from_hex(&color);
        }
        info!(
            "Imported {} bindings from {}",
            outcome.mapping.len(),
            self.import_path.display()
        );
        Ok(self.import_path.clone())
    }

    /// Pointer movement or any key or click counts as activity
    fn read_input(ctx: &Context) -> (bool, bool) {
        ctx.input(|i| {
            let activity = i.pointer.is_moving()
                || i.events.iter().any(|event| {
                    matches!(event, Event::Key { .. } | Event::PointerButton { .. })
                });
            let reset = i.modifiers.ctrl && i.modifiers.shift && i.key_pressed(Key::R);
            (activity, reset)
        })
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.frames.record_frame(now);

        let snapshot = self.source.poll();
        self.controller.tick(snapshot.as_ref(), &mut self.view);

        let (activity, reset) = Self::read_input(ctx);
        if activity {
            self.config_bar.touch(now);
        }
        if reset {
            self.handle_action(ConfigAction::Reset);
        }

        if self.config_bar.is_visible(now) {
            let mut action = None;
            egui::TopBottomPanel::top("config_bar").show(ctx, |ui| {
                action = self
                    .config_bar
                    .show(ui, self.background, self.view.status.as_deref());
            });
            if let Some(action) = action {
                self.handle_action(action);
            }
        }

        let highlight = self.controller.current_step();
        egui::CentralPanel::default()
            .frame(panel_frame(self.background))
            .show(ctx, |ui| {
                schematic::paint(ui, &self.view.visual, highlight);
            });

        if let Some(progress) = self.controller.calibration_progress() {
            if calibration_panel::show(ctx, self.controller.current_step(), progress) {
                self.controller.skip_calibration(&mut self.view);
            }
        }

        if self.source.is_connected() {
            ctx.request_repaint();
        } else {
            let wake = self
                .config_bar
                .remaining(now)
                .map(Duration::from_secs_f64)
                .map_or(self.idle_poll, |hide_in| hide_in.min(self.idle_poll));
            ctx.request_repaint_after(wake);
        }
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::from(self.background).to_array()
    }
}
