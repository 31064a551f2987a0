//! Workspace variable-library document
//!
//! The only durable artifact this crate produces. The on-disk shape is a
//! JSON document with a top-level `$schema` and a `variables` array of
//! `{name, note, type, value}` records.

use fab_foundation::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const VARIABLE_SCHEMA: &str =
    "https://developer.microsoft.com/json-schemas/fabric/item/variableLibrary/definition/variables/1.0.0/schema.json";

/// One named variable in the library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableEntry {
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: String,
}

/// The variable-library document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableLibrary {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub variables: Vec<VariableEntry>,
}

impl Default for VariableLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableLibrary {
    pub fn new() -> Self {
        Self {
            schema: VARIABLE_SCHEMA.to_string(),
            variables: Vec::new(),
        }
    }

    /// Set a variable, overwriting any existing entry with the same name.
    pub fn set(&mut self, name: &str, value: &str) {
        self.set_with_note(name, value, "")
    }

    pub fn set_with_note(&mut self, name: &str, value: &str, note: &str) {
        match self.variables.iter_mut().find(|v| v.name == name) {
            Some(entry) => {
                entry.value = value.to_string();
                entry.note = note.to_string();
            }
            None => self.variables.push(VariableEntry {
                name: name.to_string(),
                note: note.to_string(),
                value_type: "String".to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// The source value for a name, exactly as it was set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), count = self.variables.len(), "wrote variable library");
        Ok(())
    }

    /// Load from disk, or start a fresh document when the file is absent.
    pub fn load_or_new(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_json(&std::fs::read_to_string(path)?)
        } else {
            Ok(Self::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_source_value() {
        let mut lib = VariableLibrary::new();
        lib.set("ENVIRONMENT", "production");
        assert_eq!(lib.get("ENVIRONMENT"), Some("production"));
        assert_eq!(lib.get("MISSING"), None);
    }

    #[test]
    fn test_set_overwrites_by_name() {
        let mut lib = VariableLibrary::new();
        lib.set("KEY", "first");
        lib.set("KEY", "second");
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get("KEY"), Some("second"));
    }

    #[test]
    fn test_round_trip_with_newline_and_quote() {
        let mut lib = VariableLibrary::new();
        let value = "line1\n\"quoted\" and a back\\slash";
        lib.set("API_KEY", value);

        let json = lib.to_json().unwrap();
        // Escaped forms appear in the serialized document...
        assert!(json.contains("\\n"));
        assert!(json.contains("\\\"quoted\\\""));

        // ...and parsing recovers the original content exactly.
        let restored = VariableLibrary::from_json(&json).unwrap();
        assert_eq!(restored.get("API_KEY"), Some(value));
    }

    #[test]
    fn test_document_shape() {
        let mut lib = VariableLibrary::new();
        lib.set_with_note("REGION", "westus", "deployment region");

        let doc: serde_json::Value = serde_json::from_str(&lib.to_json().unwrap()).unwrap();
        assert_eq!(doc["$schema"], VARIABLE_SCHEMA);
        assert_eq!(doc["variables"][0]["name"], "REGION");
        assert_eq!(doc["variables"][0]["note"], "deployment region");
        assert_eq!(doc["variables"][0]["type"], "String");
        assert_eq!(doc["variables"][0]["value"], "westus");
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("fabops-varlib-test");
        let path = dir.join("variables.json");
        let _ = std::fs::remove_dir_all(&dir);

        let mut lib = VariableLibrary::new();
        lib.set("A", "1");
        lib.save(&path).unwrap();

        let restored = VariableLibrary::load_or_new(&path).unwrap();
        assert_eq!(restored.get("A"), Some("1"));

        let fresh = VariableLibrary::load_or_new(&dir.join("absent.json")).unwrap();
        assert!(fresh.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
