use std::collections::HashSet;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;

use crate::forms::catalog::CatalogEntry;
use crate::repository::errors::RepositoryError;
use crate::repository::{CategoryWriter, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Download the raw product feed. Items are parsed one by one on import so a
/// single bad item does not reject the whole feed.
pub async fn fetch_catalog(source: &Url) -> ServiceResult<Vec<Value>> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|err| ServiceError::Internal(err.to_string()))?;

    let response = client
        .get(source.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|err| ServiceError::Upstream(err.to_string()))?;

    response
        .json::<Vec<Value>>()
        .await
        .map_err(|err| ServiceError::Upstream(err.to_string()))
}

/// Entry-level rejections are skipped; storage failures abort the run.
fn tolerate(err: RepositoryError) -> ServiceResult<()> {
    match err {
        RepositoryError::Conflict(_) | RepositoryError::NotFound => Ok(()),
        other => Err(other.into()),
    }
}

/// Upsert every usable feed item, keeping the feed's category and product ids.
pub fn import_catalog<R>(repo: &R, feed: Vec<Value>) -> ServiceResult<ImportSummary>
where
    R: CategoryWriter + ProductWriter + ?Sized,
{
    let mut summary = ImportSummary::default();
    let mut stored_categories = HashSet::new();

    for item in feed {
        let entry = match CatalogEntry::from_value(item) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Skipping catalog item: {err}");
                summary.skipped += 1;
                continue;
            }
        };

        if !stored_categories.contains(&entry.category_id) {
            if let Err(err) = repo.upsert_category(entry.category_id, &entry.category) {
                log::warn!(
                    "Skipping product {}: category {} not stored: {err}",
                    entry.product_id,
                    entry.category_id
                );
                tolerate(err)?;
                summary.skipped += 1;
                continue;
            }
            stored_categories.insert(entry.category_id);
        }

        match repo.upsert_product(entry.product_id, &entry.product) {
            Ok(_) => summary.imported += 1,
            Err(err) => {
                log::warn!("Skipping product {}: {err}", entry.product_id);
                tolerate(err)?;
                summary.skipped += 1;
            }
        }
    }

    log::info!(
        "Catalog import finished: {} imported, {} skipped",
        summary.imported,
        summary.skipped
    );

    Ok(summary)
}
