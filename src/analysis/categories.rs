//! Category analyzers
//!
//! Six independent detectors, one per functional category, each scanning the
//! same text against a private phrase table. Stateless and side-effect free,
//! which is what lets the dispatcher run them concurrently.

use tracing::debug;

use super::types::{DetectedService, DetectionSource, ServiceCategory};

/// Confidence assigned to every phrase-table hit
pub const CATEGORY_CONFIDENCE: f32 = 0.8;

/// Categories covered by a dedicated analyzer, in dispatch order
pub const ANALYZER_CATEGORIES: &[ServiceCategory] = &[
    ServiceCategory::Compute,
    ServiceCategory::Storage,
    ServiceCategory::Network,
    ServiceCategory::Database,
    ServiceCategory::Security,
    ServiceCategory::Monitoring,
];

const COMPUTE_INDICATORS: &[(&str, &[&str])] = &[
    ("app_service", &["app service", "web app", "webapp"]),
    (
        "function_app",
        &["function app", "azure function", "serverless"],
    ),
    ("virtual_machine", &["virtual machine", "vm scale set"]),
    (
        "kubernetes_service",
        &["kubernetes", "aks cluster", "container orchestration"],
    ),
    (
        "container_instance",
        &["container instance", "container group"],
    ),
];

const STORAGE_INDICATORS: &[(&str, &[&str])] = &[
    (
        "storage_account",
        &["storage account", "blob storage", "file share", "table storage"],
    ),
    ("data_lake", &["data lake", "adls"]),
    ("managed_disk", &["managed disk", "premium ssd"]),
];

const NETWORK_INDICATORS: &[(&str, &[&str])] = &[
    ("virtual_network", &["virtual network", "vnet", "subnet"]),
    ("load_balancer", &["load balancer", "load balancing"]),
    (
        "application_gateway",
        &["application gateway", "app gateway", "web application firewall"],
    ),
    ("api_management", &["api management", "api gateway"]),
    ("front_door", &["front door"]),
    ("cdn", &["content delivery", "cdn endpoint"]),
    ("vpn_gateway", &["vpn gateway", "vpn connection"]),
    ("expressroute", &["expressroute", "express route"]),
    ("firewall", &["firewall"]),
    ("dns_zone", &["dns zone", "dns record"]),
];

const DATABASE_INDICATORS: &[(&str, &[&str])] = &[
    (
        "sql_database",
        &["sql database", "sql server", "sql db", "azure sql"],
    ),
    ("cosmos_db", &["cosmos db", "cosmosdb", "document database"]),
    ("mysql_database", &["mysql"]),
    ("postgresql_database", &["postgresql", "postgres"]),
    ("redis_cache", &["redis", "cache for redis"]),
];

const SECURITY_INDICATORS: &[(&str, &[&str])] = &[
    ("key_vault", &["key vault", "keyvault", "secret management"]),
    (
        "active_directory",
        &["active directory", "azure ad", "entra id", "entra"],
    ),
    (
        "security_center",
        &["security center", "defender for cloud"],
    ),
    ("sentinel", &["sentinel"]),
    ("ddos_protection", &["ddos"]),
    ("bastion", &["bastion"]),
];

const MONITORING_INDICATORS: &[(&str, &[&str])] = &[
    (
        "application_insights",
        &["application insights", "app insights"],
    ),
    ("log_analytics", &["log analytics"]),
    ("azure_monitor", &["azure monitor"]),
    ("network_watcher", &["network watcher"]),
];

fn indicators_for(category: ServiceCategory) -> &'static [(&'static str, &'static [&'static str])] {
    match category {
        ServiceCategory::Compute => COMPUTE_INDICATORS,
        ServiceCategory::Storage => STORAGE_INDICATORS,
        ServiceCategory::Network => NETWORK_INDICATORS,
        ServiceCategory::Database => DATABASE_INDICATORS,
        ServiceCategory::Security => SECURITY_INDICATORS,
        ServiceCategory::Monitoring => MONITORING_INDICATORS,
        _ => &[],
    }
}

/// Scans lowercased text against one category's phrase table.
///
/// First match wins per canonical type: once any phrase for a type hits,
/// later phrases for that type are not counted again. Categories without a
/// phrase table return an empty list.
pub fn analyze_category(category: ServiceCategory, lowercase_text: &str) -> Vec<DetectedService> {
    let mut found = Vec::new();
    for (canonical_type, phrases) in indicators_for(category) {
        let matched = phrases
            .iter()
            .find(|phrase| lowercase_text.contains(*phrase));
        if let Some(phrase) = matched {
            let match_count = lowercase_text.matches(phrase).count() as u32;
            debug!(category = %category, canonical_type, phrase, match_count, "phrase hit");
            found.push(DetectedService::new(
                *canonical_type,
                category,
                CATEGORY_CONFIDENCE,
                match_count,
                DetectionSource::CategoryAnalyzer,
            ));
        }
    }
    found
}
