//! Configuration store: sole owner of the `site_config` singleton row.
//!
//! Every document read from the row goes through the migrators before it is
//! returned. Writes are conditional on the `revision` observed by the caller.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::migrators::{migrate_json_text, Migrate};
use crate::models::{
    CanonicalConfiguration, ConfigSource, ConfigurationRecord, ContactConfig, DraftState,
    ExperienceSnapshot, HomeSection, HowIWorkConfig, LegacyLiveFields, NavConfig, PagesConfig,
    PartialConfiguration, ProjectsPageConfig, PAGE_KEYS, PublishedProjection, ResumeConfig,
    SaveDraftOutcome, SeoConfig, ThemeConfig, WritingPageConfig,
};
use crate::validation::validate_configuration;

const RECORD_COLUMNS: &str = "id, draft_json, published_json, published_version, published_at, \
     updated_at, created_at, revision, nav_config, home_sections, theme, seo, pages";

/// Outcome of the publish write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishCommit {
    pub version: i64,
    pub revision: i64,
}

/// Database-backed store for the configuration singleton.
#[derive(Clone)]
pub struct ConfigStore {
    pool: SqlitePool,
}

impl ConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current optimistic revision, 0 before the row exists.
    pub async fn get_revision(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision FROM site_config WHERE singleton = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get("revision")).unwrap_or(0))
    }

    async fn find_record(&self) -> Result<Option<ConfigurationRecord>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM site_config WHERE singleton = 1",
            RECORD_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(record_from_row))
    }

    /// Full record including the draft.
    pub async fn load_admin(&self) -> Result<ConfigurationRecord, AppError> {
        self.find_record().await?.ok_or_else(|| {
            AppError::NotFound("Site configuration has not been created yet".to_string())
        })
    }

    /// Published documents only. Rows that predate draft/publish are served
    /// from their legacy live columns.
    pub async fn load_public(&self) -> Result<PublishedProjection, AppError> {
        let row = sqlx::query(
            "SELECT published_json, published_version, published_at, \
                    nav_config, home_sections, theme, seo, pages \
             FROM site_config WHERE singleton = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let not_found = || AppError::NotFound("No configuration has been published".to_string());
        let row = row.ok_or_else(not_found)?;

        let published_json: Option<String> = row.get("published_json");
        if let Some(config) =
            migrate_json_text::<CanonicalConfiguration>("published_json", published_json.as_deref())
        {
            return Ok(PublishedProjection {
                config,
                version: row.get("published_version"),
                published_at: row.get("published_at"),
                source: ConfigSource::Published,
            });
        }

        let config = legacy_from_row(&row).to_configuration().ok_or_else(not_found)?;
        Ok(PublishedProjection {
            config,
            version: 0,
            published_at: None,
            source: ConfigSource::LegacyFields,
        })
    }

    /// Merge `partial` into the draft, creating the row on first save.
    pub async fn save_draft(
        &self,
        partial: &PartialConfiguration,
        expected_revision: Option<i64>,
    ) -> Result<SaveDraftOutcome, AppError> {
        let now = Utc::now().to_rfc3339();

        let (draft, revision) = match self.find_record().await? {
            None => {
                if let Some(expected) = expected_revision.filter(|expected| *expected != 0) {
                    tracing::info!(
                        "Draft save expected revision {} but no configuration exists",
                        expected
                    );
                    return Err(AppError::conflict(0));
                }

                let draft = merge_partial(CanonicalConfiguration::default(), partial);
                let draft_json = serde_json::to_string(&draft)?;
                let id = uuid::Uuid::new_v4().to_string();

                let result = sqlx::query(
                    "INSERT OR IGNORE INTO site_config \
                        (singleton, id, draft_json, published_version, updated_at, created_at, revision) \
                     VALUES (1, ?, ?, 0, ?, ?, 1)",
                )
                .bind(&id)
                .bind(&draft_json)
                .bind(&now)
                .bind(&now)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    // Another session created the row between our read and write
                    return Err(AppError::conflict(self.get_revision().await?));
                }

                tracing::info!("Created site configuration {}", id);
                (draft, 1)
            }
            Some(record) => {
                if let Some(expected) = expected_revision {
                    if expected != record.revision {
                        return Err(AppError::WriteConflict {
                            message: format!(
                                "Revision mismatch: expected {}, current {}. Reload and reapply your changes.",
                                expected, record.revision
                            ),
                            current_revision: record.revision,
                        });
                    }
                }

                let base = record
                    .draft
                    .clone()
                    .or_else(|| record.live_configuration().map(|(config, _)| config))
                    .unwrap_or_default();
                let draft = merge_partial(base, partial);
                let draft_json = serde_json::to_string(&draft)?;

                let result = sqlx::query(
                    "UPDATE site_config SET draft_json = ?, updated_at = ?, revision = revision + 1 \
                     WHERE singleton = 1 AND revision = ?",
                )
                .bind(&draft_json)
                .bind(&now)
                .bind(record.revision)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::conflict(self.get_revision().await?));
                }

                (draft, record.revision + 1)
            }
        };

        let warnings = validate_configuration(&draft)
            .iter()
            .map(ToString::to_string)
            .collect();

        Ok(SaveDraftOutcome {
            draft,
            updated_at: now,
            revision,
            warnings,
        })
    }

    /// Admin status summary; an uncreated row reports an empty state.
    pub async fn get_draft_state(&self) -> Result<DraftState, AppError> {
        Ok(self
            .find_record()
            .await?
            .as_ref()
            .map(DraftState::from)
            .unwrap_or_else(DraftState::uninitialized))
    }

    /// Replace `published` and the legacy live columns in one statement,
    /// conditional on `expected_revision`.
    pub async fn commit_publish(
        &self,
        config: &CanonicalConfiguration,
        published_at: &str,
        expected_revision: i64,
    ) -> Result<PublishCommit, AppError> {
        let config_json = serde_json::to_string(config)?;

        let row = sqlx::query(
            "UPDATE site_config SET \
                draft_json = ?, \
                published_json = ?, \
                published_version = published_version + 1, \
                published_at = ?, \
                revision = revision + 1, \
                nav_config = ?, home_sections = ?, theme = ?, seo = ?, pages = ? \
             WHERE singleton = 1 AND revision = ? \
             RETURNING published_version, revision",
        )
        .bind(&config_json)
        .bind(&config_json)
        .bind(published_at)
        .bind(serde_json::to_string(&config.nav_config)?)
        .bind(serde_json::to_string(&config.home_sections)?)
        .bind(serde_json::to_string(&config.theme)?)
        .bind(serde_json::to_string(&config.seo)?)
        .bind(serde_json::to_string(&config.pages)?)
        .bind(expected_revision)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(PublishCommit {
                version: row.get("published_version"),
                revision: row.get("revision"),
            }),
            None => Err(AppError::conflict(self.get_revision().await?)),
        }
    }
}

/// Apply a partial update. Provided sub-documents are migrated and replace
/// their counterpart; pages are replaced one page at a time.
pub fn merge_partial(
    mut base: CanonicalConfiguration,
    partial: &PartialConfiguration,
) -> CanonicalConfiguration {
    if let Some(nav) = &partial.nav_config {
        base.nav_config = NavConfig::migrate(Some(nav));
    }
    if let Some(sections) = &partial.home_sections {
        base.home_sections = Vec::<HomeSection>::migrate(Some(sections));
    }
    if let Some(theme) = &partial.theme {
        base.theme = ThemeConfig::migrate(Some(theme));
    }
    if let Some(seo) = &partial.seo {
        base.seo = SeoConfig::migrate(Some(seo));
    }
    if let Some(pages) = &partial.pages {
        for (key, value) in pages {
            merge_page(&mut base.pages, key, value);
        }
    }
    base
}

fn merge_page(pages: &mut PagesConfig, key: &str, value: &serde_json::Value) {
    let value = Some(value);
    match key {
        "resume" => pages.resume = ResumeConfig::migrate(value),
        "contact" => pages.contact = ContactConfig::migrate(value),
        "how-i-work" | "howIWork" | "how_i_work" => {
            pages.how_i_work = HowIWorkConfig::migrate(value)
        }
        "writing" => pages.writing = WritingPageConfig::migrate(value),
        "experience" => pages.experience = ExperienceSnapshot::migrate(value),
        "projects" => pages.projects = ProjectsPageConfig::migrate(value),
        other => tracing::warn!(
            "Ignoring draft update for unknown page {:?}; known pages are {:?}",
            other,
            PAGE_KEYS
        ),
    }
}

// Helper functions for row conversion

fn legacy_from_row(row: &sqlx::sqlite::SqliteRow) -> LegacyLiveFields {
    let column = |name: &str| -> Option<String> { row.get(name) };
    LegacyLiveFields {
        nav_config: migrate_json_text("nav_config", column("nav_config").as_deref()),
        home_sections: migrate_json_text("home_sections", column("home_sections").as_deref()),
        theme: migrate_json_text("theme", column("theme").as_deref()),
        seo: migrate_json_text("seo", column("seo").as_deref()),
        pages: migrate_json_text("pages", column("pages").as_deref()),
    }
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> ConfigurationRecord {
    let draft_json: Option<String> = row.get("draft_json");
    let published_json: Option<String> = row.get("published_json");
    ConfigurationRecord {
        id: row.get("id"),
        draft: migrate_json_text("draft_json", draft_json.as_deref()),
        published: migrate_json_text("published_json", published_json.as_deref()),
        published_version: row.get("published_version"),
        published_at: row.get("published_at"),
        updated_at: row.get("updated_at"),
        created_at: row.get("created_at"),
        revision: row.get("revision"),
        legacy: legacy_from_row(row),
    }
}
