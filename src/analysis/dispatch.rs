//! Concurrent category dispatch
//!
//! Runs the six category analyzers as parallel tasks, one slot per category,
//! with a hard per-task deadline. A task that overruns or panics contributes
//! an empty list for its category instead of failing the dispatch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::categories::{analyze_category, ANALYZER_CATEGORIES};
use super::types::{DetectedService, ServiceCategory};

/// Runs every category analyzer against `text` and collects whatever
/// completes within `task_timeout` per category.
pub async fn dispatch_category_analyzers(
    text: &str,
    task_timeout: Duration,
) -> HashMap<ServiceCategory, Vec<DetectedService>> {
    let lowercase = Arc::new(text.to_lowercase());
    dispatch_with(task_timeout, move |category| {
        let text = Arc::clone(&lowercase);
        async move { analyze_category(category, &text) }
    })
    .await
}

async fn dispatch_with<F, Fut>(
    task_timeout: Duration,
    make_task: F,
) -> HashMap<ServiceCategory, Vec<DetectedService>>
where
    F: Fn(ServiceCategory) -> Fut,
    Fut: Future<Output = Vec<DetectedService>> + Send + 'static,
{
    let mut handles = Vec::with_capacity(ANALYZER_CATEGORIES.len());
    for &category in ANALYZER_CATEGORIES {
        handles.push((category, tokio::spawn(make_task(category))));
    }

    let mut results = HashMap::new();
    for (category, mut handle) in handles {
        let found = match tokio::time::timeout(task_timeout, &mut handle).await {
            Ok(Ok(found)) => found,
            Ok(Err(join_error)) => {
                warn!(
                    category = %category,
                    error = %join_error,
                    "category analyzer task failed"
                );
                Vec::new()
            }
            Err(_) => {
                // abandon the overrunning task; its result is discarded
                handle.abort();
                warn!(
                    category = %category,
                    timeout_ms = task_timeout.as_millis() as u64,
                    "category analyzer timed out"
                );
                Vec::new()
            }
        };
        results.insert(category, found);
    }
    results
}

/// Flattens per-category results into one list, in dispatch order
pub fn flatten_category_results(
    mut results: HashMap<ServiceCategory, Vec<DetectedService>>,
) -> Vec<DetectedService> {
    let mut flattened = Vec::new();
    for category in ANALYZER_CATEGORIES {
        if let Some(mut found) = results.remove(category) {
            flattened.append(&mut found);
        }
    }
    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::categories::CATEGORY_CONFIDENCE;
    use crate::analysis::types::DetectionSource;

    fn marker(category: ServiceCategory) -> DetectedService {
        DetectedService::new(
            "app_service",
            category,
            CATEGORY_CONFIDENCE,
            1,
            DetectionSource::CategoryAnalyzer,
        )
    }

    #[tokio::test]
    async fn test_dispatch_covers_all_categories() {
        let text = "a web app with a sql database and blob storage inside a vnet \
                    with a key vault and application insights";
        let results = dispatch_category_analyzers(text, Duration::from_secs(3)).await;

        assert_eq!(results.len(), ANALYZER_CATEGORIES.len());
        let has = |category: ServiceCategory, canonical: &str| {
            results[&category]
                .iter()
                .any(|s| s.canonical_type == canonical)
        };
        assert!(has(ServiceCategory::Compute, "app_service"));
        assert!(has(ServiceCategory::Database, "sql_database"));
        assert!(has(ServiceCategory::Storage, "storage_account"));
        assert!(has(ServiceCategory::Network, "virtual_network"));
        assert!(has(ServiceCategory::Security, "key_vault"));
        assert!(has(ServiceCategory::Monitoring, "application_insights"));
    }

    #[tokio::test]
    async fn test_dispatch_on_empty_text() {
        let results = dispatch_category_analyzers("", Duration::from_secs(3)).await;

        assert_eq!(results.len(), ANALYZER_CATEGORIES.len());
        assert!(results.values().all(|found| found.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrunning_task_yields_empty_category() {
        let results = dispatch_with(Duration::from_secs(1), |category| async move {
            if category == ServiceCategory::Security {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            vec![marker(category)]
        })
        .await;

        assert!(results[&ServiceCategory::Security].is_empty());
        assert_eq!(results[&ServiceCategory::Compute].len(), 1);
        assert_eq!(results[&ServiceCategory::Monitoring].len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_yields_empty_category() {
        let results = dispatch_with(Duration::from_secs(3), |category| async move {
            if category == ServiceCategory::Compute {
                panic!("analyzer blew up");
            }
            vec![marker(category)]
        })
        .await;

        assert!(results[&ServiceCategory::Compute].is_empty());
        assert_eq!(results[&ServiceCategory::Database].len(), 1);
    }

    #[test]
    fn test_flatten_follows_dispatch_order() {
        let mut map = HashMap::new();
        map.insert(ServiceCategory::Monitoring, vec![marker(ServiceCategory::Monitoring)]);
        map.insert(ServiceCategory::Compute, vec![marker(ServiceCategory::Compute)]);

        let flattened = flatten_category_results(map);

        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[0].category, ServiceCategory::Compute);
        assert_eq!(flattened[1].category, ServiceCategory::Monitoring);
    }
}
