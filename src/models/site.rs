//! Canonical site configuration document.
//!
//! The default instances here are what the public site renders before anything
//! has been published, and what the migrators fill missing fields from.

use serde::{Deserialize, Serialize};

use super::PagesConfig;

pub const DEFAULT_ACCENT_COLOR: &str = "#135BEC";
pub const DEFAULT_FONT: &str = "inter";

/// The complete, default-filled configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalConfiguration {
    pub nav_config: NavConfig,
    pub home_sections: Vec<HomeSection>,
    pub theme: ThemeConfig,
    pub seo: SeoConfig,
    pub pages: PagesConfig,
}

impl Default for CanonicalConfiguration {
    fn default() -> Self {
        Self {
            nav_config: NavConfig::default(),
            home_sections: default_home_sections(),
            theme: ThemeConfig::default(),
            seo: SeoConfig::default(),
            pages: PagesConfig::default(),
        }
    }
}

/// Top navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavConfig {
    pub links: Vec<NavLink>,
}

impl Default for NavConfig {
    fn default() -> Self {
        let links = [
            ("Projects", "/projects"),
            ("Writing", "/writing"),
            ("How I Work", "/how-i-work"),
            ("Resume", "/resume"),
            ("Contact", "/contact"),
        ]
        .into_iter()
        .enumerate()
        .map(|(order, (label, href))| NavLink {
            label: label.to_string(),
            href: href.to_string(),
            visible: true,
            order: order as u32,
            external: false,
        })
        .collect();

        Self { links }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    pub label: String,
    pub href: String,
    pub visible: bool,
    pub order: u32,
    pub external: bool,
}

/// One block of the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSection {
    pub id: String,
    pub visible: bool,
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl HomeSection {
    fn shown(id: &str, order: u32, limit: Option<u32>) -> Self {
        Self {
            id: id.to_string(),
            visible: true,
            order,
            limit,
            title: None,
        }
    }
}

/// Default home page layout.
pub fn default_home_sections() -> Vec<HomeSection> {
    vec![
        HomeSection::shown("hero", 0, None),
        HomeSection::shown("featured-projects", 1, Some(3)),
        HomeSection::shown("writing", 2, Some(3)),
        HomeSection::shown("experience", 3, None),
        HomeSection::shown("contact", 4, None),
    ]
}

/// Colour mode the site starts in before the visitor picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
    System,
}

impl ColorMode {
    /// Parse a stored mode, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ColorMode::Light),
            "dark" => Some(ColorMode::Dark),
            "system" => Some(ColorMode::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub accent_color: String,
    pub font: String,
    pub default_mode: ColorMode,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            font: DEFAULT_FONT.to_string(),
            default_mode: ColorMode::Light,
        }
    }
}

/// Search/social metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoConfig {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    pub keywords: Vec<String>,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: "Selected projects, writing and ways of working.".to_string(),
            og_image: None,
            canonical_url: None,
            keywords: Vec::new(),
        }
    }
}
