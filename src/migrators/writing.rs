//! Writing index page migrator.

use serde::Deserialize;
use serde_json::Value;

use super::{decode_lenient, lenient, HeaderWire, Migrate};
use crate::models::{WritingPageConfig, WRITING_SCHEMA_VERSION};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WritingWire {
    #[serde(default, deserialize_with = "lenient")]
    header: Option<HeaderWire>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    show_tags: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    page_size: Option<u32>,
}

impl Migrate for WritingPageConfig {
    fn migrate(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| v.is_object()) else {
            return WritingPageConfig::default();
        };

        let wire: WritingWire = decode_lenient("writing", value);
        // A bare `title` predates the header block.
        let header = wire.header.unwrap_or(HeaderWire {
            title: wire.title,
            subtitle: None,
        });

        WritingPageConfig {
            schema_version: WRITING_SCHEMA_VERSION,
            header: header.into_header(WritingPageConfig::default_header()),
            show_tags: wire.show_tags.unwrap_or(true),
            page_size: wire
                .page_size
                .unwrap_or(WritingPageConfig::DEFAULT_PAGE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_title_moves_into_header() {
        let writing = WritingPageConfig::migrate(Some(&json!({"title": "Notes", "pageSize": 20})));
        assert_eq!(writing.header.title, "Notes");
        assert_eq!(
            writing.header.subtitle,
            WritingPageConfig::default_header().subtitle
        );
        assert_eq!(writing.page_size, 20);
        assert!(writing.show_tags);
    }

    #[test]
    fn test_bad_page_size_defaults_alone() {
        let writing = WritingPageConfig::migrate(Some(&json!({
            "header": {"title": "Essays"}, "pageSize": "ten", "showTags": false
        })));
        assert_eq!(writing.page_size, WritingPageConfig::DEFAULT_PAGE_SIZE);
        assert!(!writing.show_tags);
        assert_eq!(writing.header.title, "Essays");
    }

    #[test]
    fn test_writing_idempotent() {
        let once = WritingPageConfig::migrate(Some(&json!({"showTags": false})));
        let twice = WritingPageConfig::migrate(Some(&serde_json::to_value(&once).unwrap()));
        assert_eq!(once, twice);
        assert!(!once.show_tags);
    }
}
