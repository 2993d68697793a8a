//! Custom project section migrator.
//!
//! Sections were first stored as `{ heading, content }`; they are now
//! `{ title, body }`. Detection is per section, since hand-edited rows mix both.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::{decode_lenient, decode_tagged, lenient, non_blank, resolve_order, Decoded, Migrate};
use crate::models::{ProjectSection, ProjectsPageConfig, PROJECTS_SCHEMA_VERSION};

const SECTION_DISCRIMINATORS: [&str; 2] = ["title", "body"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsWire {
    #[serde(default, deserialize_with = "lenient")]
    custom_sections: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SectionWire {
    title: String,
    body: String,
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacySectionWire {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    heading: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
}

/// Lowercase, dash-separated id derived from a title.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn section(value: &Value, index: usize) -> Option<ProjectSection> {
    if !value.is_object() {
        return None;
    }

    let decoded = decode_tagged::<SectionWire, LegacySectionWire>(
        "project section",
        value,
        &SECTION_DISCRIMINATORS,
    );
    let (id, title, body, visible, order) = match decoded {
        Decoded::Canonical(wire) => (wire.id, wire.title, wire.body, wire.visible, wire.order),
        Decoded::Legacy(wire) => (
            wire.id,
            wire.heading.unwrap_or_default(),
            wire.content.unwrap_or_default(),
            wire.visible,
            wire.order,
        ),
    };

    let title = title.trim().to_string();
    let body = body.trim().to_string();
    if title.is_empty() && body.is_empty() {
        return None;
    }

    let id = non_blank(id)
        .map(|id| id.trim().to_string())
        .or_else(|| non_blank(Some(slugify(&title))))
        .unwrap_or_else(|| format!("section-{}", index + 1));

    Some(ProjectSection {
        id,
        title,
        body,
        visible: visible.unwrap_or(true),
        order: resolve_order(order, index),
    })
}

impl Migrate for ProjectsPageConfig {
    fn migrate(value: Option<&Value>) -> Self {
        let raw_sections = match value {
            Some(Value::Array(items)) => items.clone(),
            Some(value @ Value::Object(_)) => decode_lenient::<ProjectsWire>("projects", value)
                .custom_sections
                .unwrap_or_default(),
            _ => return ProjectsPageConfig::default(),
        };

        // Two sections with the same title slug to the same id; the first wins.
        let mut seen = HashSet::new();
        let mut custom_sections: Vec<ProjectSection> = raw_sections
            .iter()
            .enumerate()
            .filter_map(|(index, value)| section(value, index))
            .filter(|section| seen.insert(section.id.clone()))
            .collect();
        custom_sections.sort_by_key(|section| section.order);

        ProjectsPageConfig {
            schema_version: PROJECTS_SCHEMA_VERSION,
            custom_sections,
        }
    }
}
