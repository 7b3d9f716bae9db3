//! Video catalog preflight check.

use super::CheckResult;
use crate::models::config::CatalogConfig;
use crate::services::catalog::StreamCatalogClient;

/// Check that the catalog accepts the configured API key.
pub async fn check(config: &CatalogConfig) -> CheckResult {
    let client = match StreamCatalogClient::new(config.clone()) {
        Ok(client) => client,
        Err(_) => {
            return CheckResult::fail(
                "Video catalog",
                "API key not configured",
                "Set STREAM_API_KEYS environment variable",
            )
        }
    };

    match client.health_check().await {
        Ok(true) => CheckResult::ok(
            "Video catalog",
            &format!("connected ({} API keys)", config.api_keys.len()),
        ),
        Ok(false) | Err(_) => CheckResult::fail(
            "Video catalog",
            "request failed",
            "Check STREAM_API_KEYS and STREAM_API_BASE",
        ),
    }
}
