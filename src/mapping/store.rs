//! Persistence of the calibration mapping and the overlay background colour.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{Mapping, MappingError};
use crate::persistence::{KeyValueStore, BACKGROUND_COLOR_KEY, CALIBRATION_KEY};

/// Chroma-key green, used until the user picks something else
pub const DEFAULT_BACKGROUND_COLOR: &str = "#00ff00";

/// Version written into exported documents
pub const EXPORT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Document produced by [`MappingStore::export_document`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub calibration: Value,
    pub background_color: String,
    pub version: String,
    pub exported_at: DateTime<Local>,
}

/// What an import changed
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub mapping: Mapping,
    pub background_color: Option<String>,
}

/// Mapping persistence on top of a [`KeyValueStore`].
pub struct MappingStore {
    backend: Box<dyn KeyValueStore>,
}

impl MappingStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Stored mapping as written, `None` when absent or malformed.
    pub fn load(&self) -> Option<Mapping> {
        let raw = match self.backend.get(CALIBRATION_KEY) {
            Some(raw) => raw,
            None => {
                debug!("No stored calibration");
                return None;
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored calibration is not valid JSON, ignoring it: {}", e);
                return None;
            }
        };

        match Mapping::from_json_value(&value) {
            Ok(mapping) if mapping.is_empty() => {
                warn!("Stored calibration contains no known roles, ignoring it");
                None
            }
            Ok(mapping) => {
                info!("Loaded calibration with {} bound roles", mapping.len());
                Some(mapping)
            }
            Err(e) => {
                warn!("Stored calibration is malformed, ignoring it: {}", e);
                None
            }
        }
    }

    pub fn save(&mut self, mapping: &Mapping) -> Result<(), MappingError> {
        let text = serde_json::to_string(mapping)
            .map_err(|e| MappingError::SerializationError(e.to_string()))?;
        self.backend.set(CALIBRATION_KEY, &text)?;
        info!("Saved calibration with {} bound roles", mapping.len());
        Ok(())
    }

    /// Forgets the stored calibration
    pub fn clear(&mut self) -> Result<(), MappingError> {
        self.backend.remove(CALIBRATION_KEY)?;
        info!("Stored calibration cleared");
        Ok(())
    }

    /// Forgets calibration and background colour
    pub fn clear_all(&mut self) -> Result<(), MappingError> {
        self.clear()?;
        self.backend.remove(BACKGROUND_COLOR_KEY)?;
        info!("Stored background color cleared");
        Ok(())
    }

    pub fn background_color(&self) -> String {
        match self.backend.get(BACKGROUND_COLOR_KEY) {
            Some(color) if parse_hex_color(&color).is_some() => color,
            Some(color) => {
                warn!("Stored background color '{}' is invalid, using default", color);
                DEFAULT_BACKGROUND_COLOR.to_string()
            }
            None => DEFAULT_BACKGROUND_COLOR.to_string(),
        }
    }

    pub fn set_background_color(&mut self, color: &str) -> Result<(), MappingError> {
        if parse_hex_color(color).is_none() {
            return Err(MappingError::InvalidColor(color.to_string()));
        }
        self.backend.set(BACKGROUND_COLOR_KEY, color)?;
        debug!("Background color set to {}", color);
        Ok(())
    }

    /// Pretty-printed export envelope. Without a stored calibration the envelope
    /// carries an empty object.
    pub fn export_document(&self) -> Result<String, MappingError> {
        let calibration = match self.load() {
            Some(mapping) => mapping.to_json_value()?,
            None => Value::Object(Default::default()),
        };

        let envelope = ExportEnvelope {
            calibration,
            background_color: self.background_color(),
            version: EXPORT_VERSION.to_string(),
            exported_at: Local::now(),
        };

        serde_json::to_string_pretty(&envelope)
            .map_err(|e| MappingError::SerializationError(e.to_string()))
    }

    /// Imports either an export envelope (a document with a `calibration` member)
    /// or a bare mapping object.
    ///
    /// The mapping is validated before anything is written; a rejected document
    /// leaves storage untouched.
    pub fn import_document(&mut self, text: &str) -> Result<ImportOutcome, MappingError> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| MappingError::InvalidDocument(e.to_string()))?;

        let object = document.as_object().ok_or_else(|| {
            MappingError::InvalidDocument("document must be a JSON object".to_string())
        })?;

        let (mapping_value, background_color) = match object.get(CALIBRATION_KEY) {
            Some(calibration) => {
                if let Some(version) = object.get("version").and_then(Value::as_str) {
                    info!("Importing configuration exported by version {}", version);
                }
                let color = object
                    .get(BACKGROUND_COLOR_KEY)
                    .and_then(Value::as_str)
                    .map(str::to_string);
                (calibration, color)
            }
            None => {
                info!("Importing legacy calibration document");
                (&document, None)
            }
        };

        let mapping = Mapping::from_json_value(mapping_value)?;
        if mapping.is_empty() {
            return Err(MappingError::InvalidDocument(
                "no known roles in calibration".to_string(),
            ));
        }

        self.save(&mapping)?;

        let background_color = match background_color {
            Some(color) if parse_hex_color(&color).is_some() => {
                self.set_background_color(&color)?;
                Some(color)
            }
            Some(color) => {
                warn!("Ignoring invalid background color '{}' in import", color);
                None
            }
            None => None,
        };

        info!("Imported calibration with {} bound roles", mapping.len());
        Ok(ImportOutcome {
            mapping,
            background_color,
        })
    }
}

/// Parses `#RRGGBB`
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

pub fn format_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{AxisDirection, LogicalInput, PhysicalInput};
    use crate::persistence::MemoryStore;
    use serde_json::json;

    fn store() -> MappingStore {
        MappingStore::new(Box::new(MemoryStore::new()))
    }

    fn store_with(calibration: &str) -> MappingStore {
        let mut backend = MemoryStore::new();
        backend.set(CALIBRATION_KEY, calibration).unwrap();
        MappingStore::new(Box::new(backend))
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut mapping = Mapping::default_bindings();
        mapping.bind(
            LogicalInput::Right,
            PhysicalInput::Axis {
                index: 0,
                direction: AxisDirection::Positive,
            },
        );
        mapping.bind(
            LogicalInput::Left,
            PhysicalInput::Axis {
                index: 0,
                direction: AxisDirection::Negative,
            },
        );

        let mut store = store();
        store.save(&mapping).unwrap();
        assert_eq!(store.load(), Some(mapping));
    }

    #[test]
    fn partial_mapping_round_trips_unchanged() {
        let mut mapping = Mapping::new();
        mapping.bind(LogicalInput::Action4, PhysicalInput::Button(11));

        let mut store = store();
        store.save(&mapping).unwrap();
        assert_eq!(store.load(), Some(mapping));
    }

    #[test]
    fn absent_or_malformed_calibration_loads_as_none() {
        assert_eq!(store().load(), None);
        assert_eq!(store_with("{not json").load(), None);
        assert_eq!(store_with("[1,2]").load(), None);
        assert_eq!(store_with(r#"{"vb1":"x"}"#).load(), None);
        assert_eq!(store_with(r#"{"unknown":1}"#).load(), None);
    }

    #[test]
    fn clear_removes_calibration() {
        let mut store = store();
        store.save(&Mapping::default_bindings()).unwrap();
        store.set_background_color("#123456").unwrap();

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        assert_eq!(store.background_color(), "#123456");

        store.clear_all().unwrap();
        assert_eq!(store.background_color(), DEFAULT_BACKGROUND_COLOR);
    }

    #[test]
    fn background_color_is_validated() {
        let mut store = store();
        assert_eq!(store.background_color(), DEFAULT_BACKGROUND_COLOR);
        assert!(store.set_background_color("green").is_err());
        assert!(store.set_background_color("#12345g").is_err());
        store.set_background_color("#A0b1C2").unwrap();
        assert_eq!(store.background_color(), "#A0b1C2");
    }

    #[test]
    fn legacy_document_import() {
        let mut store = store();
        let outcome = store
            .import_document(r#"{"vbLeft": 2, "vb1": {"axis": 3, "direction": 1}}"#)
            .unwrap();

        assert_eq!(outcome.background_color, None);
        assert_eq!(outcome.mapping.len(), 2);
        assert_eq!(store.load(), Some(outcome.mapping));
    }

    #[test]
    fn envelope_import_sets_mapping_and_color() {
        let mut store = store();
        let document = json!({
            "calibration": {"vbUp": 13, "vbDown": 12},
            "backgroundColor": "#000000",
            "version": "1.2.0",
            "exportedAt": "2026-01-01T10:00:00+01:00",
            "somethingElse": true
        });

        let outcome = store.import_document(&document.to_string()).unwrap();
        assert_eq!(outcome.background_color.as_deref(), Some("#000000"));
        assert_eq!(
            store.load().unwrap().get(LogicalInput::Down),
            Some(PhysicalInput::Button(12))
        );
        assert_eq!(store.background_color(), "#000000");
    }

    #[test]
    fn rejected_import_leaves_storage_untouched() {
        let mut store = store();
        store.save(&Mapping::default_bindings()).unwrap();

        assert!(store.import_document("not json").is_err());
        assert!(store.import_document("[]").is_err());
        assert!(store
            .import_document(r#"{"calibration": {"vb1": {"axis": 1, "direction": 3}}}"#)
            .is_err());
        assert!(store.import_document(r#"{"calibration": {}}"#).is_err());

        assert_eq!(store.load(), Some(Mapping::default_bindings()));
    }

    #[test]
    fn export_then_import_restores_everything() {
        let mut source = store();
        let mut mapping = Mapping::default_bindings();
        mapping.bind(LogicalInput::Action2, PhysicalInput::Button(10));
        source.save(&mapping).unwrap();
        source.set_background_color("#ff00ff").unwrap();

        let exported = source.export_document().unwrap();
        let envelope: ExportEnvelope = serde_json::from_str(&exported).unwrap();
        assert_eq!(envelope.version, EXPORT_VERSION);
        assert_eq!(envelope.background_color, "#ff00ff");

        let mut target = store();
        target.import_document(&exported).unwrap();
        assert_eq!(target.load(), Some(mapping));
        assert_eq!(target.background_color(), "#ff00ff");
    }

    #[test]
    fn export_without_calibration_carries_empty_object() {
        let exported = store().export_document().unwrap();
        let value: Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(value["calibration"], json!({}));
        assert_eq!(value["backgroundColor"], json!(DEFAULT_BACKGROUND_COLOR));
    }

    #[test]
    fn hex_color_helpers() {
        assert_eq!(parse_hex_color("#00ff00"), Some([0, 255, 0]));
        assert_eq!(parse_hex_color("00ff00"), None);
        assert_eq!(parse_hex_color("#0f0"), None);
        assert_eq!(format_hex_color([255, 107, 107]), "#ff6b6b");
    }
}
