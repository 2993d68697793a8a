//! Experience snapshot migrator.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_items, decode_tagged, lenient, non_blank, resolve_order, Decoded, Migrate};
use crate::models::{ExperienceItem, ExperienceSnapshot, EXPERIENCE_SCHEMA_VERSION};

const EXPERIENCE_DISCRIMINATORS: [&str; 2] = ["enabled", "items"];

#[derive(Debug, Deserialize)]
struct ExperienceWire {
    enabled: bool,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemWire {
    #[serde(default, deserialize_with = "lenient")]
    company: Option<String>,
    #[serde(default, alias = "title", deserialize_with = "lenient")]
    role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    period: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    start: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    end: Option<String>,
    #[serde(default, alias = "description", deserialize_with = "lenient")]
    summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
}

impl ItemWire {
    fn period(&mut self) -> String {
        if let Some(period) = non_blank(self.period.take()) {
            return period.trim().to_string();
        }
        match (non_blank(self.start.take()), non_blank(self.end.take())) {
            (Some(start), Some(end)) => format!("{} - {}", start.trim(), end.trim()),
            (Some(start), None) => format!("{} - present", start.trim()),
            (None, Some(end)) => end.trim().to_string(),
            (None, None) => String::new(),
        }
    }
}

/// The snapshot used to be a bare list; it was shown whenever it had entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyExperienceWire {
    Items(Vec<Value>),
    Object(LegacyExperienceObject),
}

impl Default for LegacyExperienceWire {
    fn default() -> Self {
        LegacyExperienceWire::Items(Vec::new())
    }
}

#[derive(Debug, Default, Deserialize)]
struct LegacyExperienceObject {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    items: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    entries: Option<Vec<Value>>,
}

fn items(entries: &[Value]) -> Vec<ExperienceItem> {
    let mut items: Vec<ExperienceItem> = decode_items::<ItemWire>("experience item", entries)
        .into_iter()
        .enumerate()
        .map(|(index, mut wire)| ExperienceItem {
            period: wire.period(),
            company: wire.company.unwrap_or_default().trim().to_string(),
            role: wire.role.unwrap_or_default().trim().to_string(),
            summary: wire.summary.unwrap_or_default().trim().to_string(),
            visible: wire.visible.unwrap_or(true),
            order: resolve_order(wire.order, index),
        })
        .collect();
    items.sort_by_key(|item| item.order);
    items
}

impl Migrate for ExperienceSnapshot {
    fn migrate(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| v.is_object() || v.is_array()) else {
            return ExperienceSnapshot::default();
        };

        let (enabled, title, wires) = match decode_tagged::<ExperienceWire, LegacyExperienceWire>(
            "experience",
            value,
            &EXPERIENCE_DISCRIMINATORS,
        ) {
            Decoded::Canonical(wire) => (wire.enabled, wire.title, wire.items),
            Decoded::Legacy(LegacyExperienceWire::Items(wires)) => (!wires.is_empty(), None, wires),
            Decoded::Legacy(LegacyExperienceWire::Object(object)) => {
                let wires = object.items.or(object.entries).unwrap_or_default();
                (!wires.is_empty(), object.title, wires)
            }
        };

        ExperienceSnapshot {
            schema_version: EXPERIENCE_SCHEMA_VERSION,
            enabled,
            title: title.unwrap_or_else(|| ExperienceSnapshot::DEFAULT_TITLE.to_string()),
            items: items(&wires),
        }
    }
}
