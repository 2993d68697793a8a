//! Migrators for the site-wide documents: navigation, home layout, theme, SEO,
//! the page map, and the whole configuration.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::{decode_items, decode_lenient, lenient, non_blank, resolve_order, Migrate};
use crate::models::{
    default_home_sections, CanonicalConfiguration, ColorMode, ContactConfig, ExperienceSnapshot,
    HomeSection, HowIWorkConfig, NavConfig, NavLink, PagesConfig, ProjectsPageConfig,
    ResumeConfig, SeoConfig, ThemeConfig, WritingPageConfig,
};

/// Look up the first of several spellings of a key.
fn field<'a>(value: Option<&'a Value>, keys: &[&str]) -> Option<&'a Value> {
    let object = value?.as_object()?;
    keys.iter().find_map(|key| object.get(*key))
}

impl Migrate for CanonicalConfiguration {
    fn migrate(value: Option<&Value>) -> Self {
        Self {
            nav_config: NavConfig::migrate(field(value, &["navConfig", "nav_config"])),
            home_sections: Vec::<HomeSection>::migrate(field(
                value,
                &["homeSections", "home_sections"],
            )),
            theme: ThemeConfig::migrate(field(value, &["theme"])),
            seo: SeoConfig::migrate(field(value, &["seo"])),
            pages: PagesConfig::migrate(field(value, &["pages"])),
        }
    }
}

// ==================== NAVIGATION ====================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavLinkWire {
    #[serde(default, deserialize_with = "lenient")]
    label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    href: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    external: Option<bool>,
}

fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("mailto:")
}

impl Migrate for NavConfig {
    fn migrate(value: Option<&Value>) -> Self {
        // Navigation used to be stored as a bare list of links.
        let links = match value {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Object(_)) => match field(value, &["links"]) {
                Some(Value::Array(items)) => items.as_slice(),
                _ => return NavConfig::default(),
            },
            _ => return NavConfig::default(),
        };

        let mut links: Vec<NavLink> = decode_items::<NavLinkWire>("navConfig link", links)
            .into_iter()
            .enumerate()
            .map(|(index, link)| {
                let href = link.href.unwrap_or_default().trim().to_string();
                NavLink {
                    label: link.label.unwrap_or_default().trim().to_string(),
                    external: link.external.unwrap_or_else(|| is_external(&href)),
                    href,
                    visible: link.visible.unwrap_or(true),
                    order: resolve_order(link.order, index),
                }
            })
            .collect();
        links.sort_by_key(|link| link.order);

        NavConfig { links }
    }
}

// ==================== HOME SECTIONS ====================

#[derive(Debug, Default, Deserialize)]
struct HomeSectionWire {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    order: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    limit: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
}

impl Migrate for Vec<HomeSection> {
    fn migrate(value: Option<&Value>) -> Self {
        let defaults = default_home_sections();
        let entries: Vec<(String, HomeSectionWire, usize)> = match value {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.is_object())
                .filter_map(|(index, item)| {
                    let section: HomeSectionWire = decode_lenient("homeSections entry", item);
                    let id = non_blank(section.id.clone())?;
                    Some((id.trim().to_string(), section, index))
                })
                .collect(),
            // Older rows keyed the sections by id, sometimes with a bare
            // visibility flag as the value.
            Some(Value::Object(map)) => map
                .iter()
                .enumerate()
                .map(|(index, (id, entry))| {
                    let section = match entry {
                        Value::Bool(visible) => HomeSectionWire {
                            visible: Some(*visible),
                            ..HomeSectionWire::default()
                        },
                        entry => decode_lenient("homeSections entry", entry),
                    };
                    // Known sections keep their usual slot; unknown ones follow.
                    let natural = defaults
                        .iter()
                        .position(|d| d.id == *id)
                        .unwrap_or(defaults.len() + index);
                    (id.trim().to_string(), section, natural)
                })
                .filter(|(id, _, _)| !id.is_empty())
                .collect(),
            _ => return defaults,
        };

        // A non-empty list with no readable entry is as unusable as no list.
        let had_items = value
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty());
        if entries.is_empty() && had_items {
            return defaults;
        }

        let mut seen = HashSet::new();
        let mut sections: Vec<HomeSection> = entries
            .into_iter()
            .filter(|(id, _, _)| seen.insert(id.clone()))
            .map(|(id, section, natural)| HomeSection {
                id,
                visible: section.visible.unwrap_or(true),
                order: resolve_order(section.order, natural),
                limit: section.limit,
                title: non_blank(section.title),
            })
            .collect();
        sections.sort_by_key(|section| section.order);
        sections
    }
}

// ==================== THEME ====================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeWire {
    #[serde(default, deserialize_with = "lenient")]
    accent_color: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    font: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    default_mode: Option<String>,
}

impl Migrate for ThemeConfig {
    fn migrate(value: Option<&Value>) -> Self {
        let defaults = ThemeConfig::default();
        let Some(value) = value.filter(|v| v.is_object()) else {
            return defaults;
        };

        let wire: ThemeWire = decode_lenient("theme", value);
        ThemeConfig {
            accent_color: non_blank(wire.accent_color)
                .map(|color| color.trim().to_string())
                .unwrap_or(defaults.accent_color),
            font: non_blank(wire.font)
                .map(|font| font.trim().to_string())
                .unwrap_or(defaults.font),
            default_mode: wire
                .default_mode
                .as_deref()
                .and_then(ColorMode::parse)
                .unwrap_or(defaults.default_mode),
        }
    }
}

// ==================== SEO ====================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeoWire {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    og_image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    canonical_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    keywords: Option<Vec<Value>>,
}

impl Migrate for SeoConfig {
    fn migrate(value: Option<&Value>) -> Self {
        let defaults = SeoConfig::default();
        let Some(value) = value.filter(|v| v.is_object()) else {
            return defaults;
        };

        let wire: SeoWire = decode_lenient("seo", value);
        SeoConfig {
            title: wire.title.unwrap_or(defaults.title),
            description: wire.description.unwrap_or(defaults.description),
            og_image: non_blank(wire.og_image),
            canonical_url: non_blank(wire.canonical_url),
            keywords: wire
                .keywords
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

// ==================== PAGE MAP ====================

impl Migrate for PagesConfig {
    fn migrate(value: Option<&Value>) -> Self {
        PagesConfig {
            resume: ResumeConfig::migrate(field(value, &["resume"])),
            contact: ContactConfig::migrate(field(value, &["contact"])),
            how_i_work: HowIWorkConfig::migrate(field(
                value,
                &["how-i-work", "howIWork", "how_i_work"],
            )),
            writing: WritingPageConfig::migrate(field(value, &["writing"])),
            experience: ExperienceSnapshot::migrate(field(value, &["experience"])),
            projects: ProjectsPageConfig::migrate(field(value, &["projects"])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn twice<T: Migrate + serde::Serialize>(value: &Value) -> (T, T) {
        let once = T::migrate(Some(value));
        let again = T::migrate(Some(&serde_json::to_value(&once).unwrap()));
        (once, again)
    }

    #[test]
    fn test_nav_legacy_array_becomes_links() {
        let nav = NavConfig::migrate(Some(&json!([
            {"label": "Work", "href": "/projects"},
            {"label": "GitHub", "href": "https://github.com/me", "order": 0},
        ])));

        assert_eq!(nav.links.len(), 2);
        // explicit order 0 ties with natural index 0; stable sort keeps input order
        assert_eq!(nav.links[0].label, "Work");
        assert!(nav.links[1].external);
        assert!(nav.links.iter().all(|link| link.visible));
    }

    #[test]
    fn test_nav_idempotent() {
        let (once, again) = twice::<NavConfig>(&json!({
            "links": [{"label": "B", "href": "/b", "order": 5}, {"label": "A", "href": "/a"}]
        }));
        assert_eq!(once, again);
        assert_eq!(once.links[0].label, "A");
    }

    #[test]
    fn test_nav_object_without_links_is_default() {
        assert_eq!(NavConfig::migrate(Some(&json!({}))), NavConfig::default());
        assert_eq!(NavConfig::migrate(Some(&json!("garbage"))), NavConfig::default());
    }

    #[test]
    fn test_home_sections_keyed_legacy_shape() {
        let sections = Vec::<HomeSection>::migrate(Some(&json!({
            "writing": {"visible": false, "limit": 5},
            "hero": {},
            "talks": {"title": "Talks"}
        })));

        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["hero", "writing", "talks"]);
        assert!(!sections[1].visible);
        assert_eq!(sections[1].limit, Some(5));
        assert_eq!(sections[2].title.as_deref(), Some("Talks"));
    }

    #[test]
    fn test_home_sections_drop_duplicates_and_unnamed() {
        let sections = Vec::<HomeSection>::migrate(Some(&json!([
            {"id": "hero"},
            {"id": "hero", "visible": false},
            {"visible": true},
            {"id": "contact", "title": "  "}
        ])));

        assert_eq!(sections.len(), 2);
        assert!(sections[0].visible);
        assert_eq!(sections[1].title, None);
    }

    #[test]
    fn test_home_sections_idempotent() {
        let (once, again) = twice::<Vec<HomeSection>>(&json!({
            "experience": {"order": 1}, "hero": {"order": 9}, "custom": {}
        }));
        assert_eq!(once, again);
    }

    #[test]
    fn test_theme_defaults_and_mode_parsing() {
        let theme = ThemeConfig::migrate(None);
        assert_eq!(theme.accent_color, "#135BEC");
        assert_eq!(theme.default_mode, ColorMode::Light);

        let theme = ThemeConfig::migrate(Some(&json!({
            "accentColor": "#FF0000", "defaultMode": "Dark", "extra": true
        })));
        assert_eq!(theme.accent_color, "#FF0000");
        assert_eq!(theme.default_mode, ColorMode::Dark);
        assert_eq!(theme.font, "inter");

        let theme = ThemeConfig::migrate(Some(&json!({"defaultMode": "sepia", "font": ""})));
        assert_eq!(theme.default_mode, ColorMode::Light);
        assert_eq!(theme.font, "inter");
    }

    #[test]
    fn test_seo_keywords_cleaned() {
        let (once, again) = twice::<SeoConfig>(&json!({
            "title": "Jane Doe", "keywords": [" rust ", "", "design"], "ogImage": ""
        }));
        assert_eq!(once, again);
        assert_eq!(once.keywords, vec!["rust", "design"]);
        assert_eq!(once.og_image, None);
        assert_eq!(once.description, SeoConfig::default().description);
    }

    #[test]
    fn test_bad_link_field_keeps_sibling_links() {
        let nav = NavConfig::migrate(Some(&json!({"links": [
            {"label": "Work", "href": "/projects"},
            {"label": "Blog", "href": "/writing", "order": -1},
            "stray"
        ]})));

        let labels: Vec<&str> = nav.links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Work", "Blog"]);
        assert_eq!(nav.links[1].order, 1);
    }

    #[test]
    fn test_bad_theme_field_defaults_alone() {
        let theme = ThemeConfig::migrate(Some(&json!({
            "accentColor": "#FF0000", "defaultMode": "dark", "font": 3
        })));
        assert_eq!(theme.accent_color, "#FF0000");
        assert_eq!(theme.default_mode, ColorMode::Dark);
        assert_eq!(theme.font, "inter");
    }

    #[test]
    fn test_home_sections_malformed_values() {
        let sections = Vec::<HomeSection>::migrate(Some(&json!([
            {"id": "hero"},
            {"id": "writing", "limit": 2.5}
        ])));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].id, "writing");
        assert_eq!(sections[1].limit, None);

        assert_eq!(
            Vec::<HomeSection>::migrate(Some(&json!("hero,writing"))),
            default_home_sections()
        );
        assert_eq!(Vec::<HomeSection>::migrate(None), default_home_sections());
        assert_eq!(
            Vec::<HomeSection>::migrate(Some(&json!([1, "hero", {"id": ""}]))),
            default_home_sections()
        );
        assert!(Vec::<HomeSection>::migrate(Some(&json!([]))).is_empty());

        let keyed = Vec::<HomeSection>::migrate(Some(&json!({"hero": true, "contact": false})));
        assert_eq!(keyed.len(), 2);
        assert!(!keyed[1].visible);
    }

    #[test]
    fn test_seo_skips_non_string_keywords() {
        let seo = SeoConfig::migrate(Some(&json!({"title": "Jane", "keywords": ["rust", 4, null]})));
        assert_eq!(seo.keywords, vec!["rust"]);
        assert_eq!(seo.title, "Jane");
    }

    #[test]
    fn test_pages_accept_key_aliases() {
        let pages = PagesConfig::migrate(Some(&json!({
            "howIWork": ["Ship small"]
        })));
        assert_eq!(pages.how_i_work.principles[0].title, "Ship small");
        assert_eq!(pages.contact, ContactConfig::default());
    }
}
