//! Anonymous read of the published configuration.

use axum::extract::State;
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::migrators::should_show_contact_in_nav;
use crate::models::PublishedProjection;
use crate::AppState;

/// Published configuration plus the flags the renderer derives from it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigView {
    #[serde(flatten)]
    pub projection: PublishedProjection,
    pub show_contact_in_nav: bool,
}

impl From<PublishedProjection> for PublicConfigView {
    fn from(projection: PublishedProjection) -> Self {
        let show_contact_in_nav = should_show_contact_in_nav(&projection.config.pages.contact);
        Self {
            projection,
            show_contact_in_nav,
        }
    }
}

/// GET /api/public/config - Published configuration, defaults before the first publish.
///
/// `revisionId` is the published version so that cache hits never touch the store.
pub async fn get_public_config(State(state): State<AppState>) -> ApiResult<PublicConfigView> {
    match state.publisher.public_config().await {
        Ok(projection) => {
            let version = projection.version;
            success(projection.into(), version)
        }
        Err(e) => error(e, 0),
    }
}
