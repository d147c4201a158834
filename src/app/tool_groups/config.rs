//! Tool-Modus, Bindings und Optionen je Tool innerhalb einer ToolGroup.

use crate::core::Binding;
use crate::error::{CoordinationError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Modus eines Tools innerhalb seiner ToolGroup.
///
/// Jeder Übergang ist erlaubt, auch Sprünge über Zwischenstufen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolMode {
    /// Keine Overlays, keine Events
    #[default]
    Disabled,
    /// Nur Overlays
    Enabled,
    /// Overlays plus Hover/Selektion
    Passive,
    /// Overlays, Hover, Bindings und Manipulation
    Active,
}

impl ToolMode {
    /// Zeichnet das Tool Overlays?
    pub fn renders_overlays(self) -> bool {
        !matches!(self, ToolMode::Disabled)
    }

    /// Reagiert das Tool auf Hover?
    pub fn accepts_hover(self) -> bool {
        matches!(self, ToolMode::Passive | ToolMode::Active)
    }
}

/// Freie Tool-Optionen als JSON-Objekt mit typisierten Zugriffen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolOptions(Map<String, Value>);

impl ToolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-Variante von [`ToolOptions::insert`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Serialisiert `value` unter `key` (z.B. eine Konfigurationstabelle).
    pub fn insert_serialized<T: Serialize>(&mut self, key: &str, value: &T) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn f32(&self, key: &str) -> Option<f32> {
        self.0.get(key).and_then(Value::as_f64).map(|v| v as f32)
    }

    pub fn u32(&self, key: &str) -> Option<u32> {
        self.0
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Liste von Strings; Nicht-String-Einträge werden übersprungen.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.0.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )
    }

    /// Deserialisiert den Wert unter `key`; fehlender Schlüssel → `Ok(None)`.
    pub fn parse<T: DeserializeOwned>(&self, tool: &str, key: &str) -> Result<Option<T>> {
        let Some(value) = self.0.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| CoordinationError::InvalidToolOptions {
                tool: tool.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ToolOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Konfiguration eines Tools in genau einer ToolGroup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub name: String,
    pub mode: ToolMode,
    /// Gespeicherte Bindings; nur im Modus `Active` wirksam
    pub bindings: Vec<Binding>,
    pub options: ToolOptions,
}

impl ToolConfig {
    /// Neues Tool im Modus `Disabled` ohne Bindings.
    pub fn new(name: impl Into<String>, options: ToolOptions) -> Self {
        Self {
            name: name.into(),
            mode: ToolMode::Disabled,
            bindings: Vec::new(),
            options,
        }
    }

    /// Teilt das Tool mindestens ein Binding mit `bindings`?
    pub fn shares_binding(&self, bindings: &[Binding]) -> bool {
        self.bindings
            .iter()
            .any(|own| bindings.iter().any(|other| own.normalized() == other.normalized()))
    }
}

/// Parameter für `set_tool_active`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationOptions {
    /// `Some` ersetzt die gespeicherten Bindings; `None`/leer übernimmt sie
    pub bindings: Option<Vec<Binding>>,
}

impl ActivationOptions {
    pub fn with_bindings(bindings: impl IntoIterator<Item = Binding>) -> Self {
        Self {
            bindings: Some(bindings.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InputButton, ModifierKey};

    #[test]
    fn test_typed_accessors() {
        let opts = ToolOptions::new()
            .with("radius", 3.5)
            .with("segment_index", 2)
            .with("target_viewport_ids", serde_json::json!(["A", 7, "B"]));
        assert_eq!(opts.f32("radius"), Some(3.5));
        assert_eq!(opts.u32("segment_index"), Some(2));
        assert_eq!(
            opts.string_list("target_viewport_ids"),
            Some(vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(opts.str("radius"), None);
    }

    #[test]
    fn test_parse_reports_tool_and_key() {
        let opts = ToolOptions::new().with("bindings", "kaputt");
        let err = opts
            .parse::<Vec<Binding>>("Zoom", "bindings")
            .expect_err("String ist keine Binding-Liste");
        assert!(matches!(
            err,
            CoordinationError::InvalidToolOptions { ref tool, ref key, .. } if tool == "Zoom" && key == "bindings"
        ));
        assert_eq!(opts.parse::<Vec<Binding>>("Zoom", "fehlt"), Ok(None));
    }

    #[test]
    fn test_shares_binding_normalizes_empty_modifiers() {
        let mut config = ToolConfig::new("Pan", ToolOptions::new());
        config.bindings = vec![Binding {
            button: InputButton::Primary,
            modifiers: Some(crate::core::ModifierKeys::NONE),
        }];
        assert!(config.shares_binding(&[Binding::new(InputButton::Primary)]));
        assert!(!config.shares_binding(&[Binding::with_modifiers(
            InputButton::Primary,
            ModifierKey::Shift
        )]));
    }
}
