//! Organ, subpart and catalog records shared by the live API and the fallback asset

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM: &str = "General";
pub const DEFAULT_CLINICAL_IMPORTANCE: &str = "Important for medical diagnosis and treatment";

/// A top-level anatomical entity with its model markup and ordered subparts
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Organ {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default = "default_system")]
    pub system: String,
    #[serde(default)]
    pub model_image: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub subparts: Vec<Subpart>,
}

/// A named sub-structure of an organ
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Subpart {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub fun_fact: String,
    #[serde(default)]
    pub clinical_importance: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub model_section: Option<String>,
}

/// Summary row of the organ library (`GET /api/organs`)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default = "default_system")]
    pub system: String,
    #[serde(default)]
    pub description: String,
}

/// Outcome of an image classification request
#[derive(Clone, Debug, PartialEq)]
pub struct UploadResult {
    pub success: bool,
    pub part: String,
    pub confidence: f64,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Confidence given to organs picked by hand from the library
pub const MANUAL_SELECTION_CONFIDENCE: f64 = 0.95;

impl UploadResult {
    pub fn detected(part: impl Into<String>, confidence: f64) -> Self {
        Self {
            success: true,
            part: part.into(),
            confidence: confidence.clamp(0.0, 1.0),
            error: None,
            message: None,
        }
    }

    pub fn manual(part: impl Into<String>) -> Self {
        Self::detected(part, MANUAL_SELECTION_CONFIDENCE)
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

fn default_system() -> String {
    DEFAULT_SYSTEM.to_string()
}

impl Organ {
    /// Decode an organ body and normalize it against the identifier it was requested under
    pub fn from_json(id: &str, bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let organ: Organ = serde_json::from_slice(bytes)?;
        Ok(organ.normalize(id))
    }

    /// Fill identifiers and ordinals the source left out.
    ///
    /// Display order is array order, so a missing `number` becomes the 1-based position.
    pub fn normalize(mut self, id: &str) -> Self {
        if self.id.is_empty() {
            self.id = id.to_string();
        }
        for (index, subpart) in self.subparts.iter_mut().enumerate() {
            if subpart.number.is_none() {
                subpart.number = Some(index as u32 + 1);
            }
            if subpart.id.is_empty() {
                subpart.id = subpart.name.to_lowercase().replace(' ', "_");
            }
        }
        self
    }

    pub fn headline(&self) -> &str {
        match self.full_description.as_deref() {
            Some(full) if !full.trim().is_empty() => full,
            _ => &self.description,
        }
    }
}

impl Subpart {
    pub fn ordinal(&self) -> u32 {
        self.number.unwrap_or(1)
    }

    pub fn body(&self) -> &str {
        match self.detailed_description.as_deref() {
            Some(detail) if !detail.trim().is_empty() => detail,
            _ => &self.description,
        }
    }

    pub fn clinical_note(&self) -> &str {
        self.clinical_importance
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_CLINICAL_IMPORTANCE)
    }
}

/// Decode a catalog body
pub fn catalog_from_json(bytes: &[u8]) -> Result<Vec<CatalogEntry>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fills_id_and_ordinals() {
        let body = br#"{
            "name": "Heart",
            "subparts": [
                {"name": "Right Atrium"},
                {"name": "Left Ventricle", "number": 7}
            ]
        }"#;
        let organ = Organ::from_json("heart", body).unwrap();

        assert_eq!(organ.id, "heart");
        assert_eq!(organ.system, DEFAULT_SYSTEM);
        assert_eq!(organ.subparts[0].number, Some(1));
        assert_eq!(organ.subparts[0].id, "right_atrium");
        assert_eq!(organ.subparts[1].number, Some(7));
    }

    #[test]
    fn test_organ_without_subparts_decodes() {
        let body = br#"{"name": "Liver", "emoji": "x", "description": "Detox organ"}"#;
        let organ = Organ::from_json("liver", body).unwrap();
        assert!(organ.subparts.is_empty());
        assert!(organ.model_image.is_none());
        assert_eq!(organ.headline(), "Detox organ");
    }

    #[test]
    fn test_subpart_text_fallbacks() {
        let subpart = Subpart {
            id: "x".into(),
            name: "X".into(),
            number: None,
            function: String::new(),
            description: "short".into(),
            detailed_description: Some("  ".into()),
            fun_fact: String::new(),
            clinical_importance: None,
            dimensions: None,
            color: None,
            model_section: None,
        };
        assert_eq!(subpart.body(), "short");
        assert_eq!(subpart.clinical_note(), DEFAULT_CLINICAL_IMPORTANCE);
        assert_eq!(subpart.ordinal(), 1);
    }

    #[test]
    fn test_confidence_percent_rounds() {
        assert_eq!(UploadResult::detected("lungs", 0.87).confidence_percent(), 87);
        assert_eq!(UploadResult::detected("lungs", 0.876).confidence_percent(), 88);
        assert_eq!(UploadResult::manual("heart").confidence_percent(), 95);
    }
}
