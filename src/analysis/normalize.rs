//! Result normalization and reconciliation
//!
//! Merges raw detections from any combination of sources into the final
//! component list: synonym canonicalization, dedup by canonical type,
//! category backfill, relationship filtering, and confidence scoring.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::types::{
    default_display_name, AnalysisResult, AnalysisStrategy, DetectedService, Relationship,
    ServiceCategory,
};

/// Components at or above this confidence count toward the accuracy score
pub const HIGH_CONFIDENCE_FLOOR: f32 = 0.8;

/// Synonym table mapping observed type strings (already lowercased and
/// underscore-joined) onto the canonical vocabulary. Unknown strings pass
/// through unmapped.
const SYNONYMS: &[(&str, &str)] = &[
    ("webapp", "app_service"),
    ("web_app", "app_service"),
    ("website", "app_service"),
    ("web_application", "app_service"),
    ("azure_app_service", "app_service"),
    ("app_services", "app_service"),
    ("function", "function_app"),
    ("functions", "function_app"),
    ("azure_function", "function_app"),
    ("azure_functions", "function_app"),
    ("serverless_function", "function_app"),
    ("vm", "virtual_machine"),
    ("vms", "virtual_machine"),
    ("virtual_machines", "virtual_machine"),
    ("azure_vm", "virtual_machine"),
    ("aks", "kubernetes_service"),
    ("kubernetes", "kubernetes_service"),
    ("k8s", "kubernetes_service"),
    ("kubernetes_cluster", "kubernetes_service"),
    ("azure_kubernetes_service", "kubernetes_service"),
    ("container", "container_instance"),
    ("containers", "container_instance"),
    ("aci", "container_instance"),
    ("container_instances", "container_instance"),
    ("sql", "sql_database"),
    ("sql_server", "sql_database"),
    ("sql_db", "sql_database"),
    ("azure_sql", "sql_database"),
    ("azure_sql_database", "sql_database"),
    ("mssql", "sql_database"),
    ("database", "sql_database"),
    ("relational_database", "sql_database"),
    ("cosmos", "cosmos_db"),
    ("cosmosdb", "cosmos_db"),
    ("azure_cosmos_db", "cosmos_db"),
    ("documentdb", "cosmos_db"),
    ("document_db", "cosmos_db"),
    ("nosql_database", "cosmos_db"),
    ("mysql", "mysql_database"),
    ("azure_database_for_mysql", "mysql_database"),
    ("postgres", "postgresql_database"),
    ("postgresql", "postgresql_database"),
    ("azure_database_for_postgresql", "postgresql_database"),
    ("redis", "redis_cache"),
    ("cache", "redis_cache"),
    ("azure_cache_for_redis", "redis_cache"),
    ("storage", "storage_account"),
    ("blob", "storage_account"),
    ("blob_storage", "storage_account"),
    ("azure_storage", "storage_account"),
    ("azure_storage_account", "storage_account"),
    ("file_storage", "storage_account"),
    ("file_share", "storage_account"),
    ("datalake", "data_lake"),
    ("data_lake_storage", "data_lake"),
    ("adls", "data_lake"),
    ("disk", "managed_disk"),
    ("managed_disks", "managed_disk"),
    ("vnet", "virtual_network"),
    ("network", "virtual_network"),
    ("virtual_networks", "virtual_network"),
    ("subnet", "virtual_network"),
    ("lb", "load_balancer"),
    ("load_balancing", "load_balancer"),
    ("azure_load_balancer", "load_balancer"),
    ("app_gateway", "application_gateway"),
    ("waf", "application_gateway"),
    ("web_application_firewall", "application_gateway"),
    ("api", "api_management"),
    ("apim", "api_management"),
    ("api_gateway", "api_management"),
    ("azure_api_management", "api_management"),
    ("frontdoor", "front_door"),
    ("azure_front_door", "front_door"),
    ("express_route", "expressroute"),
    ("vpn", "vpn_gateway"),
    ("dns", "dns_zone"),
    ("azure_dns", "dns_zone"),
    ("content_delivery_network", "cdn"),
    ("azure_cdn", "cdn"),
    ("azure_firewall", "firewall"),
    ("bastion_host", "bastion"),
    ("azure_bastion", "bastion"),
    ("keyvault", "key_vault"),
    ("vault", "key_vault"),
    ("azure_key_vault", "key_vault"),
    ("secrets_management", "key_vault"),
    ("ad", "active_directory"),
    ("aad", "active_directory"),
    ("azure_ad", "active_directory"),
    ("azure_active_directory", "active_directory"),
    ("entra", "active_directory"),
    ("entra_id", "active_directory"),
    ("identity_provider", "active_directory"),
    ("defender", "security_center"),
    ("azure_security_center", "security_center"),
    ("azure_sentinel", "sentinel"),
    ("siem", "sentinel"),
    ("ddos", "ddos_protection"),
    ("servicebus", "service_bus"),
    ("azure_service_bus", "service_bus"),
    ("message_queue", "service_bus"),
    ("queue", "service_bus"),
    ("eventhub", "event_hub"),
    ("event_hubs", "event_hub"),
    ("eventgrid", "event_grid"),
    ("logicapp", "logic_app"),
    ("logic_apps", "logic_app"),
    ("workflow", "logic_app"),
    ("app_insights", "application_insights"),
    ("appinsights", "application_insights"),
    ("insights", "application_insights"),
    ("log_analytics_workspace", "log_analytics"),
    ("monitor", "azure_monitor"),
    ("monitoring", "azure_monitor"),
    ("synapse", "synapse_analytics"),
    ("azure_synapse", "synapse_analytics"),
    ("data_warehouse", "synapse_analytics"),
    ("adf", "data_factory"),
    ("azure_data_factory", "data_factory"),
    ("azure_databricks", "databricks"),
    ("aml", "machine_learning"),
    ("azure_machine_learning", "machine_learning"),
    ("ml_workspace", "machine_learning"),
    ("cognitive_service", "cognitive_services"),
    ("openai", "openai_service"),
    ("azure_openai", "openai_service"),
    ("iothub", "iot_hub"),
    ("azure_iot_hub", "iot_hub"),
    ("digital_twin", "digital_twins"),
    ("azure_devops", "devops"),
    ("automation", "automation_account"),
];

/// Canonical type to functional category
const CATEGORY_TABLE: &[(ServiceCategory, &[&str])] = &[
    (
        ServiceCategory::Compute,
        &[
            "app_service",
            "function_app",
            "virtual_machine",
            "kubernetes_service",
            "container_instance",
            "service_fabric",
            "batch_account",
        ],
    ),
    (
        ServiceCategory::Database,
        &[
            "sql_database",
            "cosmos_db",
            "mysql_database",
            "postgresql_database",
            "redis_cache",
        ],
    ),
    (
        ServiceCategory::Storage,
        &["storage_account", "data_lake", "managed_disk"],
    ),
    (
        ServiceCategory::Network,
        &[
            "virtual_network",
            "load_balancer",
            "application_gateway",
            "api_management",
            "front_door",
            "traffic_manager",
            "expressroute",
            "vpn_gateway",
            "dns_zone",
            "cdn",
            "firewall",
        ],
    ),
    (
        ServiceCategory::Security,
        &[
            "key_vault",
            "active_directory",
            "security_center",
            "sentinel",
            "ddos_protection",
            "bastion",
        ],
    ),
    (
        ServiceCategory::Monitoring,
        &[
            "application_insights",
            "log_analytics",
            "azure_monitor",
            "network_watcher",
        ],
    ),
    (
        ServiceCategory::Integration,
        &["service_bus", "event_hub", "event_grid", "logic_app"],
    ),
    (
        ServiceCategory::Analytics,
        &["synapse_analytics", "data_factory", "databricks"],
    ),
    (
        ServiceCategory::Ai,
        &["machine_learning", "cognitive_services", "openai_service"],
    ),
    (ServiceCategory::Iot, &["iot_hub", "digital_twins"]),
    (
        ServiceCategory::Management,
        &["devops", "automation_account"],
    ),
];

/// Normalizes an observed type string onto the canonical vocabulary.
/// Lowercases, joins whitespace/hyphen runs with underscores, then applies
/// the synonym table; unmapped strings pass through normalized.
pub fn canonicalize_type(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_separator = !normalized.is_empty();
        } else {
            if pending_separator {
                normalized.push('_');
                pending_separator = false;
            }
            normalized.push(ch);
        }
    }

    match SYNONYMS.iter().find(|(from, _)| *from == normalized) {
        Some((_, canonical)) => (*canonical).to_string(),
        None => normalized,
    }
}

/// Looks up the functional category of a canonical type, `Other` when unmapped
pub fn category_for(canonical_type: &str) -> ServiceCategory {
    CATEGORY_TABLE
        .iter()
        .find_map(|(category, types)| types.contains(&canonical_type).then_some(*category))
        .unwrap_or(ServiceCategory::Other)
}

/// Reconciles raw components and relationships into the final result.
///
/// Steps run in a fixed order: canonicalize, dedup keeping the
/// highest-confidence instance (ties keep the first encountered), backfill
/// categories, drop relationships with unknown endpoints, score.
pub fn reconcile(
    components: Vec<DetectedService>,
    relationships: Vec<Relationship>,
    strategy: AnalysisStrategy,
    tokens_consumed: u32,
    degraded: bool,
    summary: Option<String>,
) -> AnalysisResult {
    let mut kept: Vec<DetectedService> = Vec::new();
    let mut index_by_type: HashMap<String, usize> = HashMap::new();

    for mut component in components {
        component.canonical_type = canonicalize_type(&component.canonical_type);
        // a blank type cannot participate in dedup or relationships
        if component.canonical_type.is_empty() {
            continue;
        }
        if component.display_name.trim().is_empty() {
            component.display_name = default_display_name(&component.canonical_type);
        }
        if component.category == ServiceCategory::Other {
            component.category = category_for(&component.canonical_type);
        }

        match index_by_type.get(&component.canonical_type) {
            Some(&existing) => {
                if component.confidence > kept[existing].confidence {
                    kept[existing] = component;
                }
            }
            None => {
                index_by_type.insert(component.canonical_type.clone(), kept.len());
                kept.push(component);
            }
        }
    }

    let canonical_names: HashSet<&str> =
        kept.iter().map(|c| c.canonical_type.as_str()).collect();
    let display_names: HashSet<String> =
        kept.iter().map(|c| c.display_name.to_lowercase()).collect();

    let relationships: Vec<Relationship> = relationships
        .into_iter()
        .filter(|rel| {
            endpoint_known(&rel.source_name, &canonical_names, &display_names)
                && endpoint_known(&rel.target_name, &canonical_names, &display_names)
        })
        .collect();

    let total = kept.len();
    let aggregate_confidence = if total == 0 {
        0.0
    } else {
        kept.iter().map(|c| c.confidence).sum::<f32>() / total as f32
    };
    let accuracy_score = if total == 0 {
        0.0
    } else {
        let high = kept
            .iter()
            .filter(|c| c.confidence >= HIGH_CONFIDENCE_FLOOR)
            .count();
        high as f32 / total as f32
    };

    debug!(
        components = total,
        relationships = relationships.len(),
        accuracy_score,
        "reconciled analysis result"
    );

    AnalysisResult {
        components: kept,
        relationships,
        strategy_used: strategy,
        aggregate_confidence,
        accuracy_score,
        tokens_consumed,
        degraded,
        summary,
    }
}

fn endpoint_known(
    name: &str,
    canonical_names: &HashSet<&str>,
    display_names: &HashSet<String>,
) -> bool {
    canonical_names.contains(canonicalize_type(name).as_str())
        || display_names.contains(&name.to_lowercase())
}
