use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Gemini model identifier.
///
/// This can be a predefined model or a custom string value for models that
/// may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for preview or tuned models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Flash-Lite
    #[serde(rename = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,

    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
}

impl KnownModel {
    /// Every known model, in the order offered to the user.
    pub const ALL: [KnownModel; 4] = [
        KnownModel::Gemini25Flash,
        KnownModel::Gemini25FlashLite,
        KnownModel::Gemini25Pro,
        KnownModel::Gemini20Flash,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25FlashLite => "gemini-2.5-flash-lite",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gemini25Flash)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{known_model}"),
            Model::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("models/");
        KnownModel::ALL
            .iter()
            .find(|known| known.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(model.trim().to_string()),
        }
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::from(model.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::Gemini25Flash);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-2.5-flash""#);
    }

    #[test]
    fn custom_model_serialization() {
        let model = Model::Custom("gemini-exp-1206".to_string());
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-exp-1206""#);
    }

    #[test]
    fn model_deserialization() {
        let model: Model = serde_json::from_str(r#""gemini-2.5-pro""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini25Pro));

        let model: Model = serde_json::from_str(r#""gemini-exp-1206""#).unwrap();
        assert_eq!(model, Model::Custom("gemini-exp-1206".to_string()));
    }

    #[test]
    fn from_str_recognizes_known_models() {
        assert_eq!(
            Model::from("gemini-2.5-flash-lite"),
            Model::Known(KnownModel::Gemini25FlashLite)
        );
        assert_eq!(
            Model::from("models/gemini-2.0-flash"),
            Model::Known(KnownModel::Gemini20Flash)
        );
        assert_eq!(
            Model::from(" my-tuned-model "),
            Model::Custom("my-tuned-model".to_string())
        );
    }

    #[test]
    fn default_is_flash() {
        assert_eq!(Model::default().to_string(), "gemini-2.5-flash");
    }
}
