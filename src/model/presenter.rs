//! Render-ready view models derived from organ data
//!
//! Nothing here touches the terminal; the `view` module only draws what
//! these functions return.

use super::markup::{self, VectorModel};
use super::organ::{CatalogEntry, Organ, Subpart};
use super::types::{DataOrigin, Detection};

#[derive(Clone, Debug, PartialEq)]
pub struct OrganHeader {
    pub title: String,
    pub emoji: String,
    pub description: String,
    pub system: String,
    pub source: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubpartRow {
    pub badge: usize,
    pub name: String,
    pub function: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubpartDetail {
    pub number: u32,
    pub name: String,
    pub function: String,
    pub anatomy: String,
    pub clinical_importance: String,
    pub fact: String,
    pub dimensions: Option<String>,
    pub highlight_caption: String,
    pub model: Option<VectorModel>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogCard {
    pub title: String,
    pub system: String,
    pub description: String,
    pub selected: bool,
}

pub fn detection_label(detection: &Detection) -> String {
    format!("Detected: {}", detection.organ_id)
}

pub fn confidence_label(detection: &Detection) -> String {
    format!("AI Confidence: {}%", (detection.confidence * 100.0).round() as u32)
}

pub fn organ_header(organ: &Organ, origin: Option<DataOrigin>) -> OrganHeader {
    OrganHeader {
        title: organ.name.clone(),
        emoji: organ.emoji.clone(),
        description: organ.headline().trim().to_string(),
        system: organ.system.clone(),
        source: match origin {
            Some(DataOrigin::Live) => "live",
            Some(DataOrigin::Fallback) => "offline demo data",
            None => "",
        },
    }
}

/// Parsed base model, or `None` when the organ ships no usable markup
pub fn base_model(organ: &Organ) -> Option<VectorModel> {
    let markup = organ.model_image.as_deref()?;
    let model = markup::parse_model(markup);
    (!model.is_empty()).then_some(model)
}

pub fn subpart_rows(organ: &Organ, selected: Option<usize>) -> Vec<SubpartRow> {
    organ
        .subparts
        .iter()
        .enumerate()
        .map(|(index, subpart)| SubpartRow {
            badge: index + 1,
            name: subpart.name.clone(),
            function: subpart.function.clone(),
            active: selected == Some(index),
        })
        .collect()
}

pub fn subpart_detail(organ: &Organ, subpart: &Subpart) -> SubpartDetail {
    let model = base_model(organ).map(|base| markup::compose(&base, subpart.model_section.as_deref()));

    SubpartDetail {
        number: subpart.ordinal(),
        name: subpart.name.clone(),
        function: subpart.function.clone(),
        anatomy: subpart.body().trim().to_string(),
        clinical_importance: subpart.clinical_note().to_string(),
        fact: subpart.fun_fact.clone(),
        dimensions: subpart.dimensions.clone().filter(|d| !d.trim().is_empty()),
        highlight_caption: format!("Structure {} highlighted in the interactive model", subpart.ordinal()),
        model,
    }
}

pub fn catalog_cards(catalog: &[CatalogEntry], selected: usize) -> Vec<CatalogCard> {
    catalog
        .iter()
        .enumerate()
        .map(|(index, entry)| CatalogCard {
            title: format!("{} {}", entry.emoji, entry.name).trim().to_string(),
            system: entry.system.clone(),
            description: entry.description.clone(),
            selected: index == selected,
        })
        .collect()
}
