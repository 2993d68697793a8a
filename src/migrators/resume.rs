//! Resume page migrator.
//!
//! The legacy resume page was only a link to a PDF.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::{
    decode_items, decode_tagged, lenient, non_blank, resolve_order, Decoded, HeaderWire, Migrate,
};
use crate::models::{ResumeConfig, ResumeSection, RESUME_SCHEMA_VERSION};

const RESUME_DISCRIMINATORS: [&str; 2] = ["header", "sections"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResumeWire {
    header: HeaderWire,
    sections: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pdf_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    show_download: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SectionWire {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyResumeWire {
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    resume_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pdf_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    show_download: Option<bool>,
}

fn sections(entries: &[Value]) -> Vec<ResumeSection> {
    let mut seen = HashSet::new();
    let mut sections: Vec<ResumeSection> = decode_items::<SectionWire>("resume section", entries)
        .into_iter()
        .filter_map(|wire| {
            let id = non_blank(wire.id)?.trim().to_string();
            seen.insert(id.clone())
                .then_some((id, wire.title, wire.visible, wire.order))
        })
        .enumerate()
        .map(|(index, (id, title, visible, order))| ResumeSection {
            id,
            title: non_blank(title),
            visible: visible.unwrap_or(true),
            order: resolve_order(order, index),
        })
        .collect();
    sections.sort_by_key(|section| section.order);
    sections
}

impl Migrate for ResumeConfig {
    fn migrate(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| v.is_object()) else {
            return ResumeConfig::default();
        };

        match decode_tagged::<ResumeWire, LegacyResumeWire>("resume", value, &RESUME_DISCRIMINATORS)
        {
            Decoded::Canonical(wire) => {
                let pdf_url = non_blank(wire.pdf_url).map(|url| url.trim().to_string());
                ResumeConfig {
                    schema_version: RESUME_SCHEMA_VERSION,
                    header: wire.header.into_header(ResumeConfig::default_header()),
                    show_download: wire.show_download.unwrap_or(pdf_url.is_some()),
                    pdf_url,
                    sections: sections(&wire.sections),
                }
            }
            Decoded::Legacy(wire) => {
                let pdf_url = non_blank(wire.pdf_url.or(wire.resume_url).or(wire.url))
                    .map(|url| url.trim().to_string());
                let header = HeaderWire {
                    title: non_blank(wire.title),
                    subtitle: None,
                };
                ResumeConfig {
                    schema_version: RESUME_SCHEMA_VERSION,
                    header: header.into_header(ResumeConfig::default_header()),
                    show_download: wire.show_download.unwrap_or(pdf_url.is_some()),
                    pdf_url,
                    sections: ResumeConfig::default_sections(),
                }
            }
        }
    }
}
