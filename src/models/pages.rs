//! Per-page configuration documents.
//!
//! Each page document carries its own `schemaVersion`, stamped by its migrator.

use serde::{Deserialize, Serialize};

pub const CONTACT_SCHEMA_VERSION: u32 = 2;
pub const HOW_I_WORK_SCHEMA_VERSION: u32 = 2;
pub const EXPERIENCE_SCHEMA_VERSION: u32 = 2;
pub const RESUME_SCHEMA_VERSION: u32 = 2;
pub const PROJECTS_SCHEMA_VERSION: u32 = 2;
pub const WRITING_SCHEMA_VERSION: u32 = 1;

/// Page configuration map, keyed by logical page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PagesConfig {
    pub resume: ResumeConfig,
    pub contact: ContactConfig,
    #[serde(rename = "how-i-work")]
    pub how_i_work: HowIWorkConfig,
    pub writing: WritingPageConfig,
    pub experience: ExperienceSnapshot,
    pub projects: ProjectsPageConfig,
}

/// Logical page keys, in the order pages are merged and validated.
pub const PAGE_KEYS: [&str; 6] = [
    "resume",
    "contact",
    "how-i-work",
    "writing",
    "experience",
    "projects",
];

/// Title block shared by most pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHeader {
    pub title: String,
    pub subtitle: String,
}

impl PageHeader {
    pub fn new(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        }
    }
}

// ==================== CONTACT ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactConfig {
    pub schema_version: u32,
    pub header: PageHeader,
    pub contact_info: ContactInfo,
    pub ctas: Vec<ContactCta>,
}

impl ContactConfig {
    pub fn default_header() -> PageHeader {
        PageHeader::new("Get in touch", "Open to interesting work and good conversations.")
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            schema_version: CONTACT_SCHEMA_VERSION,
            header: Self::default_header(),
            contact_info: ContactInfo::default(),
            ctas: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: ContactChannel,
    pub linkedin: ContactChannel,
    pub calendar: ContactChannel,
}

impl ContactInfo {
    pub fn channels(&self) -> [(&'static str, &ContactChannel); 3] {
        [
            ("email", &self.email),
            ("linkedin", &self.linkedin),
            ("calendar", &self.calendar),
        ]
    }
}

/// A single way of reaching the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactChannel {
    pub value: String,
    pub visible: bool,
}

impl ContactChannel {
    pub fn is_reachable(&self) -> bool {
        self.visible && !self.value.trim().is_empty()
    }
}

impl Default for ContactChannel {
    fn default() -> Self {
        Self {
            value: String::new(),
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CtaStyle {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCta {
    pub label: String,
    pub href: String,
    pub style: CtaStyle,
    pub visible: bool,
    pub order: u32,
}

// ==================== HOW I WORK ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HowIWorkConfig {
    pub schema_version: u32,
    pub header: PageHeader,
    pub principles: Vec<Principle>,
}

impl HowIWorkConfig {
    pub fn default_header() -> PageHeader {
        PageHeader::new("How I work", "The habits behind the projects.")
    }
}

impl Default for HowIWorkConfig {
    fn default() -> Self {
        Self {
            schema_version: HOW_I_WORK_SCHEMA_VERSION,
            header: Self::default_header(),
            principles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principle {
    pub title: String,
    pub description: String,
    pub visible: bool,
    pub order: u32,
}

// ==================== EXPERIENCE ====================

/// Condensed work history shown on the home and resume pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceSnapshot {
    pub schema_version: u32,
    pub enabled: bool,
    pub title: String,
    pub items: Vec<ExperienceItem>,
}

impl ExperienceSnapshot {
    pub const DEFAULT_TITLE: &'static str = "Experience";
}

impl Default for ExperienceSnapshot {
    fn default() -> Self {
        Self {
            schema_version: EXPERIENCE_SCHEMA_VERSION,
            enabled: false,
            title: Self::DEFAULT_TITLE.to_string(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    pub company: String,
    pub role: String,
    pub period: String,
    pub summary: String,
    pub visible: bool,
    pub order: u32,
}

// ==================== RESUME ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeConfig {
    pub schema_version: u32,
    pub header: PageHeader,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    pub show_download: bool,
    pub sections: Vec<ResumeSection>,
}

impl ResumeConfig {
    pub fn default_header() -> PageHeader {
        PageHeader::new("Resume", "")
    }

    pub fn default_sections() -> Vec<ResumeSection> {
        ["summary", "experience", "skills", "education"]
            .into_iter()
            .enumerate()
            .map(|(order, id)| ResumeSection {
                id: id.to_string(),
                title: None,
                visible: true,
                order: order as u32,
            })
            .collect()
    }
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            schema_version: RESUME_SCHEMA_VERSION,
            header: Self::default_header(),
            pdf_url: None,
            show_download: false,
            sections: Self::default_sections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSection {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub visible: bool,
    pub order: u32,
}

// ==================== PROJECTS ====================

/// Free-form sections appended to project case studies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsPageConfig {
    pub schema_version: u32,
    pub custom_sections: Vec<ProjectSection>,
}

impl Default for ProjectsPageConfig {
    fn default() -> Self {
        Self {
            schema_version: PROJECTS_SCHEMA_VERSION,
            custom_sections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSection {
    pub id: String,
    pub title: String,
    pub body: String,
    pub visible: bool,
    pub order: u32,
}

// ==================== WRITING ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingPageConfig {
    pub schema_version: u32,
    pub header: PageHeader,
    pub show_tags: bool,
    pub page_size: u32,
}

impl WritingPageConfig {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub fn default_header() -> PageHeader {
        PageHeader::new("Writing", "Notes, essays and write-ups.")
    }
}

impl Default for WritingPageConfig {
    fn default() -> Self {
        Self {
            schema_version: WRITING_SCHEMA_VERSION,
            header: Self::default_header(),
            show_tags: true,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}
