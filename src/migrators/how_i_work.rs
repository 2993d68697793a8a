//! "How I work" page migrator.
//!
//! Older rows stored the page as a plain list of bullet strings, optionally
//! wrapped in `{ title, bullets }`.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_lenient, decode_tagged, lenient, resolve_order, Decoded, HeaderWire, Migrate};
use crate::models::{HowIWorkConfig, Principle, HOW_I_WORK_SCHEMA_VERSION};

const HOW_I_WORK_DISCRIMINATORS: [&str; 2] = ["header", "principles"];

#[derive(Debug, Deserialize)]
struct HowIWorkWire {
    header: HeaderWire,
    principles: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct BulletFields {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyHowIWorkWire {
    Bullets(Vec<Value>),
    Object(LegacyHowIWorkObject),
}

impl Default for LegacyHowIWorkWire {
    fn default() -> Self {
        LegacyHowIWorkWire::Bullets(Vec::new())
    }
}

#[derive(Debug, Default, Deserialize)]
struct LegacyHowIWorkObject {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    bullets: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    items: Option<Vec<Value>>,
}

/// A bullet is either a bare string or an object; anything else is dropped.
fn bullet(value: &Value) -> Option<BulletFields> {
    match value {
        Value::String(text) => Some(BulletFields {
            title: Some(text.clone()),
            ..BulletFields::default()
        }),
        Value::Object(_) => Some(decode_lenient("how-i-work principle", value)),
        _ => None,
    }
}

fn principles(bullets: &[Value]) -> Vec<Principle> {
    let mut principles: Vec<Principle> = bullets
        .iter()
        .filter_map(bullet)
        .filter_map(|fields| {
            let title = fields.title.or(fields.text).unwrap_or_default();
            let description = fields.description.unwrap_or_default();
            if title.trim().is_empty() && description.trim().is_empty() {
                return None;
            }
            Some((title, description, fields.visible, fields.order))
        })
        .enumerate()
        .map(|(index, (title, description, visible, order))| Principle {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            visible: visible.unwrap_or(true),
            order: resolve_order(order, index),
        })
        .collect();
    principles.sort_by_key(|principle| principle.order);
    principles
}

impl Migrate for HowIWorkConfig {
    fn migrate(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| v.is_object() || v.is_array()) else {
            return HowIWorkConfig::default();
        };

        let (header, bullets) = match decode_tagged::<HowIWorkWire, LegacyHowIWorkWire>(
            "how-i-work",
            value,
            &HOW_I_WORK_DISCRIMINATORS,
        ) {
            Decoded::Canonical(wire) => (wire.header, wire.principles),
            Decoded::Legacy(LegacyHowIWorkWire::Bullets(bullets)) => {
                (HeaderWire::default(), bullets)
            }
            Decoded::Legacy(LegacyHowIWorkWire::Object(object)) => (
                HeaderWire {
                    title: object.title,
                    subtitle: object.subtitle,
                },
                object.bullets.or(object.items).unwrap_or_default(),
            ),
        };

        HowIWorkConfig {
            schema_version: HOW_I_WORK_SCHEMA_VERSION,
            header: header.into_header(HowIWorkConfig::default_header()),
            principles: principles(&bullets),
        }
    }
}
