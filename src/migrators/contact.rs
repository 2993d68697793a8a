//! Contact page migrator.
//!
//! The first contact page stored three flat strings (`email`, `linkedin`,
//! `calendar`). The current shape splits it into `header`, `contactInfo` and
//! `ctas`; a document is only treated as current when all three are present.

use serde::Deserialize;
use serde_json::Value;

use super::{
    decode_items, decode_tagged, lenient, non_blank, resolve_order, Decoded, HeaderWire, Migrate,
};
use crate::models::{
    ContactChannel, ContactConfig, ContactCta, ContactInfo, CtaStyle, CONTACT_SCHEMA_VERSION,
};

const CONTACT_DISCRIMINATORS: [&str; 3] = ["header", "contactInfo", "ctas"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactWire {
    header: HeaderWire,
    contact_info: ContactInfoWire,
    ctas: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ContactInfoWire {
    #[serde(default, deserialize_with = "lenient")]
    email: Option<ChannelWire>,
    #[serde(default, deserialize_with = "lenient")]
    linkedin: Option<ChannelWire>,
    #[serde(default, deserialize_with = "lenient")]
    calendar: Option<ChannelWire>,
}

/// A channel is either a bare string or `{ value, visible }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChannelWire {
    Plain(String),
    Fields(ChannelFields),
}

#[derive(Debug, Default, Deserialize)]
struct ChannelFields {
    #[serde(default, deserialize_with = "lenient")]
    value: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
}

impl ChannelWire {
    fn into_channel(self) -> ContactChannel {
        match self {
            ChannelWire::Plain(value) => ContactChannel {
                value: value.trim().to_string(),
                visible: true,
            },
            ChannelWire::Fields(fields) => ContactChannel {
                value: fields.value.unwrap_or_default().trim().to_string(),
                visible: fields.visible.unwrap_or(true),
            },
        }
    }
}

fn channel(wire: Option<ChannelWire>) -> ContactChannel {
    wire.map(ChannelWire::into_channel).unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
struct CtaWire {
    #[serde(default, deserialize_with = "lenient")]
    label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    href: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    style: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyContactWire {
    #[serde(default, deserialize_with = "lenient")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    linkedin: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    calendar: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    subtitle: Option<String>,
}

fn normalize_canonical(wire: ContactWire) -> ContactConfig {
    let mut ctas: Vec<ContactCta> = decode_items::<CtaWire>("contact cta", &wire.ctas)
        .into_iter()
        .enumerate()
        .map(|(index, cta)| ContactCta {
            label: cta.label.unwrap_or_default().trim().to_string(),
            href: cta.href.unwrap_or_default().trim().to_string(),
            style: match cta.style.as_deref().map(str::trim) {
                Some(s) if s.eq_ignore_ascii_case("secondary") => CtaStyle::Secondary,
                _ => CtaStyle::Primary,
            },
            visible: cta.visible.unwrap_or(true),
            order: resolve_order(cta.order, index),
        })
        .collect();
    ctas.sort_by_key(|cta| cta.order);

    ContactConfig {
        schema_version: CONTACT_SCHEMA_VERSION,
        header: wire.header.into_header(ContactConfig::default_header()),
        contact_info: ContactInfo {
            email: channel(wire.contact_info.email),
            linkedin: channel(wire.contact_info.linkedin),
            calendar: channel(wire.contact_info.calendar),
        },
        ctas,
    }
}

fn normalize_legacy(wire: LegacyContactWire) -> ContactConfig {
    let email = non_blank(wire.email).map(|s| s.trim().to_string());
    let linkedin = non_blank(wire.linkedin).map(|s| s.trim().to_string());
    let calendar = non_blank(wire.calendar).map(|s| s.trim().to_string());

    // The old page rendered a booking button and a mailto link; keep them.
    let mut ctas = Vec::new();
    if let Some(calendar) = &calendar {
        ctas.push(("Book a call", calendar.clone()));
    }
    if let Some(email) = &email {
        ctas.push(("Send an email", format!("mailto:{}", email)));
    }
    let ctas = ctas
        .into_iter()
        .enumerate()
        .map(|(index, (label, href))| ContactCta {
            label: label.to_string(),
            href,
            style: if index == 0 {
                CtaStyle::Primary
            } else {
                CtaStyle::Secondary
            },
            visible: true,
            order: index as u32,
        })
        .collect();

    let header = HeaderWire {
        title: non_blank(wire.title),
        subtitle: non_blank(wire.subtitle),
    };

    let shown = |value: Option<String>| ContactChannel {
        value: value.unwrap_or_default(),
        visible: true,
    };

    ContactConfig {
        schema_version: CONTACT_SCHEMA_VERSION,
        header: header.into_header(ContactConfig::default_header()),
        contact_info: ContactInfo {
            email: shown(email),
            linkedin: shown(linkedin),
            calendar: shown(calendar),
        },
        ctas,
    }
}

impl Migrate for ContactConfig {
    fn migrate(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| v.is_object()) else {
            return ContactConfig::default();
        };

        match decode_tagged::<ContactWire, LegacyContactWire>("contact", value, &CONTACT_DISCRIMINATORS)
        {
            Decoded::Canonical(wire) => normalize_canonical(wire),
            Decoded::Legacy(wire) => normalize_legacy(wire),
        }
    }
}

/// The nav only links to the contact page when there is a way to reach the owner.
pub fn should_show_contact_in_nav(config: &ContactConfig) -> bool {
    config
        .contact_info
        .channels()
        .iter()
        .any(|(_, channel)| channel.is_reachable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_contact_round_trip() {
        let config = ContactConfig::migrate(Some(&json!({
            "email": "me@example.com",
            "linkedin": "https://linkedin.com/in/me",
            "calendar": "https://cal.com/me"
        })));

        assert_eq!(config.contact_info.email.value, "me@example.com");
        assert_eq!(config.contact_info.linkedin.value, "https://linkedin.com/in/me");
        assert_eq!(config.contact_info.calendar.value, "https://cal.com/me");
        assert_eq!(config.schema_version, CONTACT_SCHEMA_VERSION);
        assert_eq!(config.header, ContactConfig::default_header());
        assert_eq!(config.ctas.len(), 2);
        assert_eq!(config.ctas[0].href, "https://cal.com/me");
        assert_eq!(config.ctas[1].href, "mailto:me@example.com");
        assert_eq!(config.ctas[1].style, CtaStyle::Secondary);
        assert!(should_show_contact_in_nav(&config));
    }

    #[test]
    fn test_show_in_nav_needs_a_channel() {
        let empty = ContactConfig::migrate(Some(&json!({
            "email": "", "linkedin": "   ", "calendar": null
        })));
        assert!(!should_show_contact_in_nav(&empty));
        assert!(empty.ctas.is_empty());

        let only_linkedin = ContactConfig::migrate(Some(&json!({"linkedin": "in/me"})));
        assert!(should_show_contact_in_nav(&only_linkedin));

        assert!(!should_show_contact_in_nav(&ContactConfig::migrate(None)));
    }

    #[test]
    fn test_hidden_channel_does_not_count() {
        let config = ContactConfig::migrate(Some(&json!({
            "header": {"title": "Say hi"},
            "contactInfo": {"email": {"value": "me@example.com", "visible": false}},
            "ctas": []
        })));
        assert_eq!(config.header.title, "Say hi");
        assert_eq!(config.header.subtitle, ContactConfig::default_header().subtitle);
        assert!(!should_show_contact_in_nav(&config));
    }

    #[test]
    fn test_new_format_fills_defaults_and_drops_unknown() {
        let config = ContactConfig::migrate(Some(&json!({
            "header": {},
            "contactInfo": {"email": "me@example.com"},
            "ctas": [{"label": "Hire me", "href": "/hire", "style": "SECONDARY", "bogus": 1}],
            "favouriteColour": "teal"
        })));

        assert_eq!(config.contact_info.email.value, "me@example.com");
        assert!(config.contact_info.linkedin.visible);
        assert_eq!(config.ctas[0].style, CtaStyle::Secondary);
        assert!(config.ctas[0].visible);
        let serialized = serde_json::to_value(&config).unwrap();
        assert!(serialized.get("favouriteColour").is_none());
    }

    #[test]
    fn test_partial_new_format_is_ambiguous_and_takes_legacy_path() {
        // header present but contactInfo/ctas missing: legacy fields still honoured
        let config = ContactConfig::migrate(Some(&json!({
            "header": {"title": "Ignored"},
            "email": "me@example.com",
            "title": "Legacy title"
        })));

        assert_eq!(config.contact_info.email.value, "me@example.com");
        assert_eq!(config.header.title, "Legacy title");
    }

    #[test]
    fn test_malformed_new_format_falls_back() {
        let config = ContactConfig::migrate(Some(&json!({
            "header": "not an object",
            "contactInfo": {},
            "ctas": [],
            "email": "fallback@example.com"
        })));
        assert_eq!(config.contact_info.email.value, "fallback@example.com");
    }

    #[test]
    fn test_bad_cta_is_dropped_alone() {
        let config = ContactConfig::migrate(Some(&json!({
            "header": {"title": "Say hi"},
            "contactInfo": {"email": "me@example.com", "linkedin": 5},
            "ctas": [
                {"label": "Hire me", "href": "/hire", "order": -1},
                "Book a call",
                {"label": "Email", "href": "mailto:me@example.com", "visible": "no"}
            ]
        })));

        let labels: Vec<&str> = config.ctas.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Hire me", "Email"]);
        assert!(config.ctas[1].visible);
        assert_eq!(config.contact_info.email.value, "me@example.com");
        assert_eq!(config.contact_info.linkedin, ContactChannel::default());
        assert_eq!(config.header.title, "Say hi");
    }

    #[test]
    fn test_contact_migration_idempotent() {
        for stored in [
            json!({"email": "me@example.com", "calendar": "https://cal.com/me"}),
            json!({"header": {"title": "Hi"}, "contactInfo": {}, "ctas": [{"label": "x", "order": 3}, {"label": "y"}]}),
            json!(null),
            json!(["nonsense"]),
        ] {
            let once = ContactConfig::migrate(Some(&stored));
            let twice = ContactConfig::migrate(Some(&serde_json::to_value(&once).unwrap()));
            assert_eq!(once, twice, "not idempotent for {}", stored);
        }
    }
}
