//! Draft to published promotion, and the cached public read path.
//!
//! Store calls made on behalf of the admin are bounded by `timeout`. A timed
//! out call surfaces as `OutcomeUnknown`: the write may still have committed,
//! so callers re-read the draft state before retrying, and the public read
//! cache is dropped both at the deadline and when a late publish commits.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::cache::{PublicConfigCache, PUBLIC_CONFIG_KEY};
use crate::db::ConfigStore;
use crate::errors::AppError;
use crate::migrators::migrate_configuration;
use crate::models::{
    PartialConfiguration, PublishOutcome, PublishedProjection, SaveDraftOutcome, ValidationReport,
};
use crate::validation::validate_configuration;

/// Orchestrates draft saves, publishes and cache invalidation.
#[derive(Clone)]
pub struct PublishEngine {
    store: ConfigStore,
    cache: Arc<PublicConfigCache>,
    timeout: Duration,
}

impl PublishEngine {
    pub fn new(store: ConfigStore, cache: Arc<PublicConfigCache>, timeout: Duration) -> Self {
        Self {
            store,
            cache,
            timeout,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "{} did not finish within {:?}; outcome unknown",
                    operation,
                    self.timeout
                );
                Err(AppError::OutcomeUnknown(format!(
                    "{} timed out; reload the draft state before retrying",
                    operation
                )))
            }
        }
    }

    /// Merge a partial update into the draft. The public document is untouched.
    pub async fn save_draft(
        &self,
        partial: &PartialConfiguration,
        expected_revision: Option<i64>,
    ) -> Result<SaveDraftOutcome, AppError> {
        let outcome = self
            .bounded("Draft save", self.store.save_draft(partial, expected_revision))
            .await?;

        if !outcome.warnings.is_empty() {
            tracing::debug!(
                "Draft saved at revision {} with {} warning(s)",
                outcome.revision,
                outcome.warnings.len()
            );
        }
        Ok(outcome)
    }

    /// Promote the draft to published.
    ///
    /// The promotion runs as its own task, so a publish the caller stopped
    /// waiting for still invalidates the read cache once its commit lands.
    pub async fn publish(&self, expected_revision: Option<i64>) -> Result<PublishOutcome, AppError> {
        let engine = self.clone();
        let task = tokio::spawn(async move {
            let outcome = engine.promote(expected_revision).await?;
            engine.cache.invalidate_all();
            Ok::<_, AppError>(outcome)
        });

        let result = self
            .bounded("Publish", async {
                task.await.unwrap_or_else(|e| {
                    Err(AppError::Internal(format!("Publish task failed: {}", e)))
                })
            })
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err @ AppError::OutcomeUnknown(_)) => {
                // The commit may already have landed.
                self.cache.invalidate_all();
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            "Published configuration version {} (revision {})",
            outcome.version,
            outcome.revision
        );
        Ok(outcome)
    }

    async fn promote(&self, expected_revision: Option<i64>) -> Result<PublishOutcome, AppError> {
        let record = match self.store.load_admin().await {
            Ok(record) => record,
            Err(AppError::NotFound(_)) => return Err(AppError::NothingToPublish),
            Err(e) => return Err(e),
        };

        if let Some(expected) = expected_revision {
            if expected != record.revision {
                return Err(AppError::conflict(record.revision));
            }
        }

        let draft = record.draft.ok_or(AppError::NothingToPublish)?;
        // Run the stored draft through the migrators once more so the
        // published snapshot is canonical even if the row was edited by hand.
        let config = migrate_configuration(Some(&serde_json::to_value(&draft)?));

        let issues = validate_configuration(&config);
        if !issues.is_empty() {
            tracing::info!("Publish blocked by {} validation issue(s)", issues.len());
            return Err(AppError::ValidationFailed(issues));
        }

        let published_at = Utc::now().to_rfc3339();
        let commit = self
            .store
            .commit_publish(&config, &published_at, record.revision)
            .await?;

        Ok(PublishOutcome {
            version: commit.version,
            published_at,
            revision: commit.revision,
        })
    }

    /// Run the publish rules against the current draft without publishing.
    pub async fn validate_draft(&self) -> Result<ValidationReport, AppError> {
        let record = self.store.load_admin().await?;
        let draft = record.draft.ok_or(AppError::NothingToPublish)?;
        let errors: Vec<String> = validate_configuration(&draft)
            .iter()
            .map(ToString::to_string)
            .collect();

        Ok(ValidationReport {
            valid: errors.is_empty(),
            errors,
        })
    }

    /// Drop every cached public read.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Published configuration for visitors, through the read cache.
    ///
    /// Falls back to the built-in defaults when nothing was ever published.
    pub async fn public_config(&self) -> Result<PublishedProjection, AppError> {
        if let Some(cached) = self.cache.get(&PUBLIC_CONFIG_KEY) {
            return Ok(cached);
        }

        let generation = self.cache.generation();
        let projection = match self.store.load_public().await {
            Ok(projection) => projection,
            Err(AppError::NotFound(_)) => PublishedProjection::defaults(),
            Err(e) => return Err(e),
        };

        self.cache
            .set_if_current(PUBLIC_CONFIG_KEY, projection.clone(), generation);
        Ok(projection)
    }
}
