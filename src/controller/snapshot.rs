/// State of a single button in a snapshot.
///
/// Analog buttons count as pressed only when fully depressed (`value == 1.0`)
/// unless the device reports an explicit pressed flag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ButtonValue {
    pub pressed: bool,
    pub value: f32,
}

impl ButtonValue {
    pub fn new(pressed_flag: bool, value: f32) -> Self {
        Self {
            pressed: pressed_flag || value == 1.0,
            value,
        }
    }

    #[cfg(test)]
    pub fn digital(pressed: bool) -> Self {
        Self {
            pressed,
            value: if pressed { 1.0 } else { 0.0 },
        }
    }

    #[cfg(test)]
    pub fn analog(value: f32) -> Self {
        Self::new(false, value)
    }
}

/// One reading of the connected gamepad, indexed in standard gamepad order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub buttons: Vec<ButtonValue>,
    /// Axis values in `[-1.0, 1.0]`
    pub axes: Vec<f32>,
}

impl Snapshot {
    pub fn new(buttons: Vec<ButtonValue>, axes: Vec<f32>) -> Self {
        Self { buttons, axes }
    }

    #[cfg(test)]
    /// `button_count` digital buttons with the given indices held
    pub fn with_pressed(button_count: usize, pressed: &[usize], axes: Vec<f32>) -> Self {
        let buttons = (0..button_count)
            .map(|index| ButtonValue::digital(pressed.contains(&index)))
            .collect();
        Self { buttons, axes }
    }

    /// Out-of-range indices read as not pressed
    pub fn button_pressed(&self, index: usize) -> bool {
        self.buttons.get(index).is_some_and(|button| button.pressed)
    }

    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    pub fn button_states(&self) -> Vec<bool> {
        self.buttons.iter().map(|button| button.pressed).collect()
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }
}
