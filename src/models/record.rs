//! The configuration singleton and the request/response shapes built on it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CanonicalConfiguration, HomeSection, NavConfig, PagesConfig, SeoConfig, ThemeConfig};

/// The single persisted configuration row, with every document already migrated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRecord {
    pub id: String,
    pub draft: Option<CanonicalConfiguration>,
    pub published: Option<CanonicalConfiguration>,
    pub published_version: i64,
    pub published_at: Option<String>,
    pub updated_at: String,
    pub created_at: String,
    /// Optimistic concurrency token, bumped by every write of the row
    pub revision: i64,
    pub legacy: LegacyLiveFields,
}

impl ConfigurationRecord {
    /// What visitors currently see: the published document, or for rows written
    /// before draft/publish existed, whatever the legacy live fields hold.
    pub fn live_configuration(&self) -> Option<(CanonicalConfiguration, ConfigSource)> {
        if let Some(published) = &self.published {
            return Some((published.clone(), ConfigSource::Published));
        }
        self.legacy
            .to_configuration()
            .map(|config| (config, ConfigSource::LegacyFields))
    }

    /// True iff a draft exists and differs from what is live.
    pub fn has_unpublished_changes(&self) -> bool {
        match (&self.draft, &self.published) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(draft), Some(published)) => draft != published,
        }
    }
}

/// Denormalized top-level columns mirroring `published`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLiveFields {
    pub nav_config: Option<NavConfig>,
    pub home_sections: Option<Vec<HomeSection>>,
    pub theme: Option<ThemeConfig>,
    pub seo: Option<SeoConfig>,
    pub pages: Option<PagesConfig>,
}

impl LegacyLiveFields {
    pub fn is_empty(&self) -> bool {
        self.nav_config.is_none()
            && self.home_sections.is_none()
            && self.theme.is_none()
            && self.seo.is_none()
            && self.pages.is_none()
    }

    /// Assemble a full document from whichever fields are present.
    pub fn to_configuration(&self) -> Option<CanonicalConfiguration> {
        if self.is_empty() {
            return None;
        }
        let defaults = CanonicalConfiguration::default();
        Some(CanonicalConfiguration {
            nav_config: self.nav_config.clone().unwrap_or(defaults.nav_config),
            home_sections: self
                .home_sections
                .clone()
                .unwrap_or(defaults.home_sections),
            theme: self.theme.clone().unwrap_or(defaults.theme),
            seo: self.seo.clone().unwrap_or(defaults.seo),
            pages: self.pages.clone().unwrap_or(defaults.pages),
        })
    }
}

/// Where a served configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSource {
    Published,
    LegacyFields,
    Defaults,
}

/// The published sub-documents only; never includes the draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedProjection {
    pub config: CanonicalConfiguration,
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub source: ConfigSource,
}

impl PublishedProjection {
    /// Built-in documents served when nothing was ever published.
    pub fn defaults() -> Self {
        Self {
            config: CanonicalConfiguration::default(),
            version: 0,
            published_at: None,
            source: ConfigSource::Defaults,
        }
    }
}

/// Partial update of the draft. Each provided sub-document replaces its
/// counterpart; `pages` replaces only the pages it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfiguration {
    #[serde(default, alias = "nav_config", skip_serializing_if = "Option::is_none")]
    pub nav_config: Option<Value>,
    #[serde(default, alias = "home_sections", skip_serializing_if = "Option::is_none")]
    pub home_sections: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Map<String, Value>>,
}

impl PartialConfiguration {
    pub fn is_empty(&self) -> bool {
        self.nav_config.is_none()
            && self.home_sections.is_none()
            && self.theme.is_none()
            && self.seo.is_none()
            && self.pages.as_ref().map_or(true, Map::is_empty)
    }
}

/// Request body for saving the draft.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    #[serde(flatten)]
    pub changes: PartialConfiguration,
    /// Revision the editor loaded; omitted means "whatever is current"
    #[serde(default)]
    pub expected_revision: Option<i64>,
}

/// Result of a successful draft save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftOutcome {
    pub draft: CanonicalConfiguration,
    pub updated_at: String,
    pub revision: i64,
    /// Non-blocking rule violations in the saved draft
    pub warnings: Vec<String>,
}

/// Request body for publishing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub expected_revision: Option<i64>,
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub version: i64,
    pub published_at: String,
    pub revision: i64,
}

/// Status summary for the admin UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftState {
    pub has_unpublished_changes: bool,
    pub published_version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub draft_json: Option<CanonicalConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub revision: i64,
}

impl DraftState {
    /// State reported before the singleton row exists.
    pub fn uninitialized() -> Self {
        Self {
            has_unpublished_changes: false,
            published_version: 0,
            published_at: None,
            draft_json: None,
            updated_at: None,
            revision: 0,
        }
    }
}

impl From<&ConfigurationRecord> for DraftState {
    fn from(record: &ConfigurationRecord) -> Self {
        Self {
            has_unpublished_changes: record.has_unpublished_changes(),
            published_version: record.published_version,
            published_at: record.published_at.clone(),
            draft_json: record.draft.clone(),
            updated_at: Some(record.updated_at.clone()),
            revision: record.revision,
        }
    }
}

/// Validation report for the current draft.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}
