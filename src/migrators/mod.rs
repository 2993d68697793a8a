//! Schema migrators.
//!
//! Every stored configuration document passes through [`Migrate::migrate`]
//! before anything else sees it. Migrators are pure and total: missing fields
//! are filled from the default instances in [`crate::models`], unknown fields
//! are dropped, a field of the wrong type falls back to its own default, and a
//! bad list entry is dropped without its siblings. Migrating an already
//! canonical document returns it unchanged.
//!
//! Stored documents carry no format tag, so documents with an older shape are
//! recognised structurally: [`detect_format`] looks for the co-occurrence of
//! every new-format key, and [`decode_tagged`] turns that into an explicit
//! [`Decoded`] value before normalization.

mod contact;
mod experience;
mod how_i_work;
mod projects;
mod resume;
mod site;
mod writing;

pub use contact::should_show_contact_in_nav;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{CanonicalConfiguration, PageHeader};

/// Normalize an arbitrary stored shape into the canonical document.
pub trait Migrate: Sized {
    fn migrate(value: Option<&Value>) -> Self;
}

/// Migrate a whole configuration document.
pub fn migrate_configuration(value: Option<&Value>) -> CanonicalConfiguration {
    CanonicalConfiguration::migrate(value)
}

/// Parse stored JSON text and migrate it; unparseable text is treated as absent.
pub fn migrate_json_text<T: Migrate>(column: &str, text: Option<&str>) -> Option<T> {
    let text = text?;
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(T::migrate(Some(&value))),
        Err(e) => {
            tracing::warn!("Discarding unparseable {} column: {}", column, e);
            None
        }
    }
}

/// Outcome of structural format detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatDetection {
    /// Every new-format key is present.
    Canonical,
    /// No new-format key is present, or the value is not an object.
    Legacy,
    /// Some but not all new-format keys are present.
    Ambiguous { present: Vec<&'static str> },
}

pub fn detect_format(value: &Value, discriminators: &[&'static str]) -> FormatDetection {
    let Some(object) = value.as_object() else {
        return FormatDetection::Legacy;
    };

    let present: Vec<&'static str> = discriminators
        .iter()
        .copied()
        .filter(|key| object.contains_key(*key))
        .collect();

    if present.len() == discriminators.len() {
        FormatDetection::Canonical
    } else if present.is_empty() {
        FormatDetection::Legacy
    } else {
        FormatDetection::Ambiguous { present }
    }
}

/// A stored document after format detection, before normalization.
#[derive(Debug)]
pub enum Decoded<C, L> {
    Canonical(C),
    Legacy(L),
}

/// Decode `value` as the new format when its shape says so, otherwise (or if
/// the strict decode fails) as the legacy format. Ambiguous shapes take the
/// legacy path.
pub fn decode_tagged<C, L>(
    document: &str,
    value: &Value,
    discriminators: &[&'static str],
) -> Decoded<C, L>
where
    C: DeserializeOwned,
    L: DeserializeOwned + Default,
{
    match detect_format(value, discriminators) {
        FormatDetection::Canonical => match C::deserialize(value) {
            Ok(canonical) => return Decoded::Canonical(canonical),
            Err(e) => {
                tracing::debug!(
                    "{} document has new-format keys but failed strict decode ({}), using legacy path",
                    document,
                    e
                );
            }
        },
        FormatDetection::Ambiguous { present } => {
            tracing::warn!(
                "MigrationAmbiguous: {} document has only {:?} of {:?}, using legacy path",
                document,
                present,
                discriminators
            );
        }
        FormatDetection::Legacy => {}
    }

    Decoded::Legacy(decode_lenient(document, value))
}

/// Deserialize into a wire type, falling back to its default on any mismatch.
pub fn decode_lenient<T: DeserializeOwned + Default>(document: &str, value: &Value) -> T {
    if value.is_null() {
        return T::default();
    }
    T::deserialize(value).unwrap_or_else(|e| {
        tracing::warn!("Could not decode {} document ({}), using defaults", document, e);
        T::default()
    })
}

/// Field deserializer for wire structs: a value of the wrong type reads as
/// absent, so one bad field falls back to its default on its own.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode list entries one at a time. Entries that are not objects are dropped;
/// the rest decode leniently, field by field.
pub(crate) fn decode_items<T: DeserializeOwned + Default>(document: &str, items: &[Value]) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| decode_lenient(document, item))
        .collect()
}

/// Header block as it may appear in storage.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct HeaderWire {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub subtitle: Option<String>,
}

impl HeaderWire {
    pub fn into_header(self, defaults: PageHeader) -> PageHeader {
        PageHeader {
            title: self.title.unwrap_or(defaults.title),
            subtitle: self.subtitle.unwrap_or(defaults.subtitle),
        }
    }
}

/// Missing `order` means natural position; the result is stably sorted.
pub(crate) fn resolve_order(explicit: Option<u32>, index: usize) -> u32 {
    explicit.unwrap_or(index as u32)
}

/// Treat blank strings like missing ones.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
