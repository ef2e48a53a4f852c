use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use tracing::{debug, error, info, warn};

use super::snapshot::{ButtonValue, Snapshot};

/// Button order of the standard gamepad layout. Snapshot index `i` is
/// `STANDARD_BUTTONS[i]`.
pub const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

/// Axis order of the standard gamepad layout
pub const STANDARD_AXES: [Axis; 4] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
];

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Gamepad API unsupported on this platform: {0}")]
    Unsupported(String),

    #[error("Failed to initialize gamepad source: {0}")]
    InitializationError(String),
}

/// Anything that can produce one gamepad reading per tick.
pub trait GamepadSource {
    /// Current reading, `None` while no device is connected
    fn poll(&mut self) -> Option<Snapshot>;

    fn is_connected(&self) -> bool;
}

#[state]
#[derive(Debug, Clone)]
pub enum SourceState {
    Initializing,
    Polling,
}

#[machine]
#[derive(Debug)]
pub struct GilrsSource<S: SourceState> {
    // Gilrs context
    gilrs: Gilrs,

    // Gamepad the snapshots are read from
    active_gamepad: Option<GamepadId>,

    // Successful polls, for the periodic stats line
    poll_count: u64,
}

impl GilrsSource<Initializing> {
    pub fn create() -> Result<Self, SourceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(gilrs::Error::NotImplemented(_)) => {
                error!("gilrs has no backend for this platform");
                return Err(SourceError::Unsupported(
                    "no gamepad backend available".to_string(),
                ));
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SourceError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(gilrs, None, 0))
    }

    /// Picks the first connected gamepad and starts polling
    pub fn initialize(mut self) -> GilrsSource<Polling> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            warn!("No gamepad connected, waiting for one");
        } else {
            info!("Found {} gamepads:", gamepads.len());
            for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
                info!(
                    "  [{}] ID: {}, Name: {}, UUID: {:?}",
                    idx,
                    id,
                    gamepad.name(),
                    gamepad.uuid()
                );
            }
            let (id, gamepad) = &gamepads[0];
            self.active_gamepad = Some(*id);
            info!("Selected gamepad: {} ({})", gamepad.name(), id);
        }

        info!("Gamepad source initialized, transitioning to Polling state");
        self.transition()
    }
}

impl GilrsSource<Polling> {
    // Drains pending events so the cached gamepad state is current
    fn pump_events(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    if self.active_gamepad.is_none() {
                        let name = self.gilrs.gamepad(id).name().to_string();
                        info!("Gamepad connected: {} ({})", name, id);
                        self.active_gamepad = Some(id);
                    } else {
                        debug!("Ignoring additional gamepad {}", id);
                    }
                }
                EventType::Disconnected => {
                    if self.active_gamepad == Some(id) {
                        warn!("Active gamepad {} disconnected", id);
                        self.active_gamepad = self
                            .gilrs
                            .gamepads()
                            .map(|(other, _)| other)
                            .find(|other| *other != id);
                        if let Some(next) = self.active_gamepad {
                            info!("Switched to gamepad {}", next);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    // Indices past the last input the device has are left out, so a sparse
    // device shows up as short arrays
    fn read_snapshot(gamepad: &Gamepad<'_>) -> Snapshot {
        let button_count = exposed_len(
            STANDARD_BUTTONS
                .iter()
                .map(|button| gamepad.button_code(*button).is_some()),
        );
        let axis_count = exposed_len(
            STANDARD_AXES
                .iter()
                .map(|axis| gamepad.axis_code(*axis).is_some()),
        );

        let buttons = STANDARD_BUTTONS[..button_count]
            .iter()
            .map(|button| {
                let value = gamepad
                    .button_data(*button)
                    .map(|data| data.value())
                    .unwrap_or(0.0);
                ButtonValue::new(gamepad.is_pressed(*button), value)
            })
            .collect();

        // gilrs reports up as positive, the standard layout as negative
        let axes = STANDARD_AXES[..axis_count]
            .iter()
            .map(|axis| match axis {
                Axis::LeftStickY | Axis::RightStickY => -gamepad.value(*axis),
                _ => gamepad.value(*axis),
            })
            .collect();

        Snapshot::new(buttons, axes)
    }
}

/// One past the last supported position
fn exposed_len(supported: impl Iterator<Item = bool>) -> usize {
    supported
        .enumerate()
        .filter(|(_, present)| *present)
        .map(|(index, _)| index + 1)
        .last()
        .unwrap_or(0)
}

impl GamepadSource for GilrsSource<Polling> {
    fn poll(&mut self) -> Option<Snapshot> {
        self.pump_events();

        let id = self.active_gamepad?;
        let gamepad = self.gilrs.connected_gamepad(id)?;

        self.poll_count += 1;
        if self.poll_count % 3600 == 0 {
            debug!("Gamepad source polled {} times", self.poll_count);
        }

        Some(Self::read_snapshot(&gamepad))
    }

    fn is_connected(&self) -> bool {
        self.active_gamepad
            .and_then(|id| self.gilrs.connected_gamepad(id))
            .is_some()
    }
}
