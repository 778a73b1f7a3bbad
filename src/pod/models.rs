//! Static catalog of the model engines a labor unit can run on.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "gemini-3-pro-preview")]
    Gemini3Pro,
    #[serde(rename = "gemini-3-flash-preview")]
    Gemini3Flash,
    #[serde(rename = "gemini-flash-lite-latest")]
    FlashLite,
}

/// Read-only facts about a model: display name, hourly cost, reliability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelMetadata {
    pub name: &'static str,
    pub cost: f64,
    pub reliability: f64,
    pub specialty: &'static str,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Gemini3Pro, ModelId::Gemini3Flash, ModelId::FlashLite];

    /// Model newly recruited units start on.
    pub const DEFAULT: ModelId = ModelId::Gemini3Flash;

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gemini3Pro => "gemini-3-pro-preview",
            ModelId::Gemini3Flash => "gemini-3-flash-preview",
            ModelId::FlashLite => "gemini-flash-lite-latest",
        }
    }

    pub fn metadata(&self) -> ModelMetadata {
        match self {
            ModelId::Gemini3Pro => ModelMetadata {
                name: "Gemini 3 Pro",
                cost: 3.50,
                reliability: 0.99,
                specialty: "Deep Reasoning / PM",
            },
            ModelId::Gemini3Flash => ModelMetadata {
                name: "Gemini 3 Flash",
                cost: 0.50,
                reliability: 0.92,
                specialty: "Speed / Translation",
            },
            ModelId::FlashLite => ModelMetadata {
                name: "Flash Lite",
                cost: 0.10,
                reliability: 0.88,
                specialty: "Micro-tasks",
            },
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_values() {
        let pro = ModelId::Gemini3Pro.metadata();
        assert_eq!(pro.name, "Gemini 3 Pro");
        assert_eq!(pro.cost, 3.50);
        assert_eq!(pro.reliability, 0.99);

        let lite = ModelId::FlashLite.metadata();
        assert_eq!(lite.cost, 0.10);
        assert_eq!(lite.specialty, "Micro-tasks");
    }

    #[test]
    fn ids_serialize_as_wire_strings() {
        for model in ModelId::ALL {
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.as_str()));
            let back: ModelId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, model);
        }
    }

    #[test]
    fn default_model_is_flash() {
        assert_eq!(ModelId::DEFAULT.to_string(), "gemini-3-flash-preview");
    }
}
