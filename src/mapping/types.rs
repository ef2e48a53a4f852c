//! Core data types of the input mapping
//!
//! A [`Mapping`] associates each of the twelve [`LogicalInput`] roles drawn on the
//! overlay with the [`PhysicalInput`] that drives it on the connected device.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::MappingError;

/// Logical role drawn on the overlay.
///
/// Serialized with the storage names `vbLeft`, `vbRight`, `vbUp`, `vbDown` and
/// `vb1`..`vb8`; the plain names (`left`, `action1`, ...) are accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogicalInput {
    #[serde(rename = "vbLeft", alias = "left")]
    Left,
    #[serde(rename = "vbRight", alias = "right")]
    Right,
    #[serde(rename = "vbUp", alias = "up")]
    Up,
    #[serde(rename = "vbDown", alias = "down")]
    Down,
    #[serde(rename = "vb1", alias = "action1")]
    Action1,
    #[serde(rename = "vb2", alias = "action2")]
    Action2,
    #[serde(rename = "vb3", alias = "action3")]
    Action3,
    #[serde(rename = "vb4", alias = "action4")]
    Action4,
    #[serde(rename = "vb5", alias = "action5")]
    Action5,
    #[serde(rename = "vb6", alias = "action6")]
    Action6,
    #[serde(rename = "vb7", alias = "action7")]
    Action7,
    #[serde(rename = "vb8", alias = "action8")]
    Action8,
}

impl LogicalInput {
    #[cfg(test)]
    pub const ALL: [LogicalInput; 12] = [
        LogicalInput::Left,
        LogicalInput::Right,
        LogicalInput::Up,
        LogicalInput::Down,
        LogicalInput::Action1,
        LogicalInput::Action2,
        LogicalInput::Action3,
        LogicalInput::Action4,
        LogicalInput::Action5,
        LogicalInput::Action6,
        LogicalInput::Action7,
        LogicalInput::Action8,
    ];

    /// Directionals in the order used when several are active at once
    pub const DIRECTIONALS: [LogicalInput; 4] = [
        LogicalInput::Left,
        LogicalInput::Right,
        LogicalInput::Up,
        LogicalInput::Down,
    ];

    pub const ACTIONS: [LogicalInput; 8] = [
        LogicalInput::Action1,
        LogicalInput::Action2,
        LogicalInput::Action3,
        LogicalInput::Action4,
        LogicalInput::Action5,
        LogicalInput::Action6,
        LogicalInput::Action7,
        LogicalInput::Action8,
    ];

    /// Zero-based index for action roles (`Action1` is 0), `None` for directionals
    pub fn action_index(self) -> Option<usize> {
        Self::ACTIONS.iter().position(|action| *action == self)
    }

    pub fn is_directional(self) -> bool {
        self.action_index().is_none()
    }
}

impl fmt::Display for LogicalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action_index() {
            Some(index) => write!(f, "Button {}", index + 1),
            None => write!(f, "{:?}", self),
        }
    }
}

impl FromStr for LogicalInput {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vbLeft" | "left" => Ok(LogicalInput::Left),
            "vbRight" | "right" => Ok(LogicalInput::Right),
            "vbUp" | "up" => Ok(LogicalInput::Up),
            "vbDown" | "down" => Ok(LogicalInput::Down),
            "vb1" | "action1" => Ok(LogicalInput::Action1),
            "vb2" | "action2" => Ok(LogicalInput::Action2),
            "vb3" | "action3" => Ok(LogicalInput::Action3),
            "vb4" | "action4" => Ok(LogicalInput::Action4),
            "vb5" | "action5" => Ok(LogicalInput::Action5),
            "vb6" | "action6" => Ok(LogicalInput::Action6),
            "vb7" | "action7" => Ok(LogicalInput::Action7),
            "vb8" | "action8" => Ok(LogicalInput::Action8),
            other => Err(MappingError::InvalidDocument(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

/// Trigger direction of an axis binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Positive,
    Negative,
}

impl AxisDirection {
    pub fn sign(self) -> f32 {
        match self {
            AxisDirection::Positive => 1.0,
            AxisDirection::Negative => -1.0,
        }
    }
}

impl TryFrom<i64> for AxisDirection {
    type Error = MappingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AxisDirection::Positive),
            -1 => Ok(AxisDirection::Negative),
            other => Err(MappingError::InvalidDirection(other)),
        }
    }
}

impl From<AxisDirection> for i64 {
    fn from(direction: AxisDirection) -> Self {
        match direction {
            AxisDirection::Positive => 1,
            AxisDirection::Negative => -1,
        }
    }
}

/// Hardware signal a role is bound to.
///
/// Stored as a bare integer for buttons and as `{"axis": index, "direction": ±1}`
/// for axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PhysicalInputRepr", into = "PhysicalInputRepr")]
pub enum PhysicalInput {
    Button(usize),
    Axis {
        index: usize,
        direction: AxisDirection,
    },
}

impl fmt::Display for PhysicalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalInput::Button(index) => write!(f, "button {}", index),
            PhysicalInput::Axis { index, direction } => match direction {
                AxisDirection::Positive => write!(f, "axis {}+", index),
                AxisDirection::Negative => write!(f, "axis {}-", index),
            },
        }
    }
}

// On-disk shape, only used through serde's try_from/into
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PhysicalInputRepr {
    Button(usize),
    Axis { axis: usize, direction: i64 },
}

impl TryFrom<PhysicalInputRepr> for PhysicalInput {
    type Error = MappingError;

    fn try_from(repr: PhysicalInputRepr) -> Result<Self, Self::Error> {
        match repr {
            PhysicalInputRepr::Button(index) => Ok(PhysicalInput::Button(index)),
            PhysicalInputRepr::Axis { axis, direction } => Ok(PhysicalInput::Axis {
                index: axis,
                direction: AxisDirection::try_from(direction)?,
            }),
        }
    }
}

impl From<PhysicalInput> for PhysicalInputRepr {
    fn from(input: PhysicalInput) -> Self {
        match input {
            PhysicalInput::Button(index) => PhysicalInputRepr::Button(index),
            PhysicalInput::Axis { index, direction } => PhysicalInputRepr::Axis {
                axis: index,
                direction: direction.into(),
            },
        }
    }
}

/// Learned association from logical roles to physical inputs.
///
/// Partially populated while calibrating, complete once all twelve roles are bound.
/// Two roles may share one physical input; see [`Mapping::duplicate_bindings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping(BTreeMap<LogicalInput, PhysicalInput>);

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings used when nothing has been calibrated yet. Directionals sit on the
    /// D-pad of the standard layout (12 up, 13 down, 14 left, 15 right).
    pub fn default_bindings() -> Self {
        let mut mapping = Self::new();
        for (role, button) in [
            (LogicalInput::Action1, 1),
            (LogicalInput::Action2, 2),
            (LogicalInput::Action3, 7),
            (LogicalInput::Action4, 6),
            (LogicalInput::Action5, 0),
            (LogicalInput::Action6, 3),
            (LogicalInput::Action7, 5),
            (LogicalInput::Action8, 4),
            (LogicalInput::Up, 12),
            (LogicalInput::Down, 13),
            (LogicalInput::Right, 15),
            (LogicalInput::Left, 14),
        ] {
            mapping.bind(role, PhysicalInput::Button(button));
        }
        mapping
    }

    /// Binds `role`, returning the previous binding if there was one
    pub fn bind(&mut self, role: LogicalInput, input: PhysicalInput) -> Option<PhysicalInput> {
        self.0.insert(role, input)
    }

    pub fn get(&self, role: LogicalInput) -> Option<PhysicalInput> {
        self.0.get(&role).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        LogicalInput::ALL.iter().all(|role| self.0.contains_key(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalInput, PhysicalInput)> + '_ {
        self.0.iter().map(|(role, input)| (*role, *input))
    }

    /// Roles that are missing here are taken from [`Mapping::default_bindings`]
    pub fn with_defaults(mut self) -> Self {
        for (role, input) in Self::default_bindings().iter() {
            self.0.entry(role).or_insert(input);
        }
        self
    }

    /// Physical inputs bound to more than one role, with the roles sharing them.
    ///
    /// Calibration accepts such bindings; callers decide whether to warn.
    pub fn duplicate_bindings(&self) -> Vec<(PhysicalInput, Vec<LogicalInput>)> {
        let mut seen: Vec<(PhysicalInput, Vec<LogicalInput>)> = Vec::new();
        for (role, input) in self.iter() {
            match seen.iter_mut().find(|(existing, _)| *existing == input) {
                Some((_, roles)) => roles.push(role),
                None => seen.push((input, vec![role])),
            }
        }
        seen.retain(|(_, roles)| roles.len() > 1);
        seen
    }

    pub fn to_json_value(&self) -> Result<Value, MappingError> {
        serde_json::to_value(self).map_err(|e| MappingError::SerializationError(e.to_string()))
    }

    /// Decodes a mapping object.
    ///
    /// Unknown role names are skipped. A known role with an undecodable descriptor
    /// rejects the whole document.
    pub fn from_json_value(value: &Value) -> Result<Self, MappingError> {
        let object = value.as_object().ok_or_else(|| {
            MappingError::InvalidDocument("mapping must be a JSON object".to_string())
        })?;

        let mut mapping = Self::new();
        for (key, descriptor) in object {
            let role = match key.parse::<LogicalInput>() {
                Ok(role) => role,
                Err(_) => {
                    debug!("Ignoring unknown mapping key '{}'", key);
                    continue;
                }
            };

            let input = serde_json::from_value::<PhysicalInput>(descriptor.clone()).map_err(
                |e| MappingError::InvalidDescriptor {
                    role: key.clone(),
                    reason: e.to_string(),
                },
            )?;
            mapping.bind(role, input);
        }
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn axis(index: usize, direction: AxisDirection) -> PhysicalInput {
        PhysicalInput::Axis { index, direction }
    }

    #[test]
    fn default_bindings_cover_every_role() {
        let mapping = Mapping::default_bindings();
        assert!(mapping.is_complete());
        assert_eq!(mapping.get(LogicalInput::Left), Some(PhysicalInput::Button(14)));
        assert_eq!(mapping.get(LogicalInput::Up), Some(PhysicalInput::Button(12)));
        assert_eq!(mapping.get(LogicalInput::Down), Some(PhysicalInput::Button(13)));
        assert_eq!(mapping.get(LogicalInput::Action5), Some(PhysicalInput::Button(0)));
        assert!(mapping.duplicate_bindings().is_empty());
    }

    #[test]
    fn descriptors_use_integer_and_axis_object_shapes() {
        let mut mapping = Mapping::new();
        mapping.bind(LogicalInput::Left, PhysicalInput::Button(14));
        mapping.bind(LogicalInput::Action3, axis(5, AxisDirection::Negative));

        let value = serde_json::to_value(&mapping).unwrap();
        assert_eq!(
            value,
            json!({"vbLeft": 14, "vb3": {"axis": 5, "direction": -1}})
        );
        assert_eq!(mapping.to_json_value().unwrap(), value);
    }

    #[test]
    fn json_round_trip_keeps_axis_direction() {
        let mut mapping = Mapping::default_bindings();
        mapping.bind(LogicalInput::Up, axis(1, AxisDirection::Negative));
        mapping.bind(LogicalInput::Action8, axis(4, AxisDirection::Positive));

        let text = serde_json::to_string(&mapping).unwrap();
        let decoded: Mapping = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, mapping);

        let lenient = Mapping::from_json_value(&mapping.to_json_value().unwrap()).unwrap();
        assert_eq!(lenient, mapping);
    }

    #[test]
    fn plain_role_names_are_accepted() {
        let mapping = Mapping::from_json_value(&json!({
            "left": 3,
            "action1": {"axis": 2, "direction": 1},
            "bogus": 9
        }))
        .unwrap();

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(LogicalInput::Left), Some(PhysicalInput::Button(3)));
        assert_eq!(
            mapping.get(LogicalInput::Action1),
            Some(axis(2, AxisDirection::Positive))
        );
    }

    #[test]
    fn invalid_descriptors_reject_the_document() {
        assert!(Mapping::from_json_value(&json!({"vb1": "three"})).is_err());
        assert!(Mapping::from_json_value(&json!({"vb1": {"axis": 1, "direction": 0}})).is_err());
        assert!(Mapping::from_json_value(&json!({"vb1": -2})).is_err());
        assert!(Mapping::from_json_value(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn with_defaults_fills_missing_roles_only() {
        let mut partial = Mapping::new();
        partial.bind(LogicalInput::Action1, PhysicalInput::Button(9));

        let filled = partial.with_defaults();
        assert!(filled.is_complete());
        assert_eq!(filled.get(LogicalInput::Action1), Some(PhysicalInput::Button(9)));
        assert_eq!(filled.get(LogicalInput::Action2), Some(PhysicalInput::Button(2)));
    }

    #[test]
    fn duplicate_physical_bindings_are_reported_not_rejected() {
        let mut mapping = Mapping::new();
        mapping.bind(LogicalInput::Action1, PhysicalInput::Button(4));
        mapping.bind(LogicalInput::Action2, PhysicalInput::Button(4));
        mapping.bind(LogicalInput::Action3, PhysicalInput::Button(5));

        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.duplicate_bindings(),
            vec![(
                PhysicalInput::Button(4),
                vec![LogicalInput::Action1, LogicalInput::Action2]
            )]
        );
    }

    #[test]
    fn action_indices_and_display_names() {
        assert_eq!(LogicalInput::Action1.action_index(), Some(0));
        assert_eq!(LogicalInput::Action8.action_index(), Some(7));
        assert!(LogicalInput::Down.is_directional());
        assert_eq!(LogicalInput::Action5.to_string(), "Button 5");
        assert_eq!(LogicalInput::Up.to_string(), "Up");
    }
}
