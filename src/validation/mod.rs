//! Content rules for a canonical configuration.
//!
//! Validation never fails; it returns every violation so callers can decide.
//! Draft saves report them as warnings, publish refuses to proceed.

use std::fmt;

use serde::Serialize;

use crate::models::{
    CanonicalConfiguration, ContactConfig, ExperienceSnapshot, HomeSection, NavConfig,
    ProjectsPageConfig, ResumeConfig, SeoConfig, ThemeConfig, WritingPageConfig,
};

pub const SEO_TITLE_MAX: usize = 60;
pub const SEO_DESCRIPTION_MAX: usize = 160;
pub const CTA_LABEL_MAX: usize = 40;
pub const NAV_LABEL_MAX: usize = 32;
pub const HOME_SECTION_LIMIT_MAX: u32 = 50;
pub const WRITING_PAGE_SIZE_MAX: u32 = 100;

/// One rule violation, addressed by its field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collects issues under a field path prefix.
struct Issues(Vec<ValidationIssue>);

impl Issues {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(field, message));
    }

    fn max_len(&mut self, field: impl Into<String>, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("must be at most {} characters", max));
        }
    }

    fn required(&mut self, field: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }
}

/// Validate every sub-document.
pub fn validate_configuration(config: &CanonicalConfiguration) -> Vec<ValidationIssue> {
    let mut issues = Issues(Vec::new());
    validate_nav(&config.nav_config, &mut issues);
    validate_home_sections(&config.home_sections, &mut issues);
    validate_theme(&config.theme, &mut issues);
    validate_seo(&config.seo, &mut issues);
    validate_contact(&config.pages.contact, &mut issues);
    validate_experience(&config.pages.experience, &mut issues);
    validate_resume(&config.pages.resume, &mut issues);
    validate_writing(&config.pages.writing, &mut issues);
    validate_projects(&config.pages.projects, &mut issues);

    for (index, principle) in config.pages.how_i_work.principles.iter().enumerate() {
        issues.max_len(
            format!("pages.how-i-work.principles[{}].title", index),
            &principle.title,
            80,
        );
    }

    issues.0
}

/// `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn looks_like_url(href: &str) -> bool {
    href.starts_with('/')
        || href.starts_with('#')
        || href.starts_with("http://")
        || href.starts_with("https://")
        || href.starts_with("mailto:")
}

fn validate_nav(nav: &NavConfig, issues: &mut Issues) {
    for (index, link) in nav.links.iter().enumerate() {
        let path = format!("navConfig.links[{}]", index);
        issues.required(format!("{}.label", path), &link.label);
        issues.max_len(format!("{}.label", path), &link.label, NAV_LABEL_MAX);
        if link.href.trim().is_empty() {
            issues.push(format!("{}.href", path), "is required");
        } else if !looks_like_url(&link.href) {
            issues.push(
                format!("{}.href", path),
                "must be a site path or an absolute URL",
            );
        }
    }
}

fn validate_home_sections(sections: &[HomeSection], issues: &mut Issues) {
    for (index, section) in sections.iter().enumerate() {
        if let Some(limit) = section.limit {
            if limit == 0 || limit > HOME_SECTION_LIMIT_MAX {
                issues.push(
                    format!("homeSections[{}].limit", index),
                    format!("must be between 1 and {}", HOME_SECTION_LIMIT_MAX),
                );
            }
        }
        if let Some(title) = &section.title {
            issues.max_len(format!("homeSections[{}].title", index), title, 80);
        }
    }
}

fn validate_theme(theme: &ThemeConfig, issues: &mut Issues) {
    if !is_hex_color(&theme.accent_color) {
        issues.push("theme.accentColor", "must be a #RRGGBB hex colour");
    }
}

fn validate_seo(seo: &SeoConfig, issues: &mut Issues) {
    issues.required("seo.title", &seo.title);
    issues.max_len("seo.title", &seo.title, SEO_TITLE_MAX);
    issues.max_len("seo.description", &seo.description, SEO_DESCRIPTION_MAX);
    if let Some(url) = &seo.canonical_url {
        if !url.starts_with("https://") && !url.starts_with("http://") {
            issues.push("seo.canonicalUrl", "must be an absolute URL");
        }
    }
}

fn validate_contact(contact: &ContactConfig, issues: &mut Issues) {
    let email = &contact.contact_info.email;
    if email.is_reachable() && !email.value.contains('@') {
        issues.push(
            "pages.contact.contactInfo.email",
            "must be a valid email address",
        );
    }

    for (index, cta) in contact.ctas.iter().enumerate() {
        if !cta.visible {
            continue;
        }
        let path = format!("pages.contact.ctas[{}]", index);
        issues.required(format!("{}.label", path), &cta.label);
        issues.max_len(format!("{}.label", path), &cta.label, CTA_LABEL_MAX);
        issues.required(format!("{}.href", path), &cta.href);
    }
}

fn validate_experience(experience: &ExperienceSnapshot, issues: &mut Issues) {
    if !experience.enabled {
        return;
    }
    issues.required("pages.experience.title", &experience.title);
    for (index, item) in experience.items.iter().enumerate() {
        if item.visible {
            issues.required(format!("pages.experience.items[{}].company", index), &item.company);
        }
    }
}

fn validate_resume(resume: &ResumeConfig, issues: &mut Issues) {
    if resume.show_download && resume.pdf_url.is_none() {
        issues.push(
            "pages.resume.pdfUrl",
            "is required when the download button is shown",
        );
    }
}

fn validate_writing(writing: &WritingPageConfig, issues: &mut Issues) {
    if writing.page_size == 0 || writing.page_size > WRITING_PAGE_SIZE_MAX {
        issues.push(
            "pages.writing.pageSize",
            format!("must be between 1 and {}", WRITING_PAGE_SIZE_MAX),
        );
    }
}

fn validate_projects(projects: &ProjectsPageConfig, issues: &mut Issues) {
    for (index, section) in projects.custom_sections.iter().enumerate() {
        if section.visible {
            issues.required(
                format!("pages.projects.customSections[{}].title", index),
                &section.title,
            );
        }
    }
}
