//! Heuristic relationship inference
//!
//! When no AI call runs (or its answer is unusable), common Azure wiring is
//! inferred from the component list alone: apps talk to databases, gateways
//! route to apps, apps write to storage.

use super::types::{DetectedService, Relationship};

const DATA_STORE_TYPES: &[&str] = &["sql_database", "cosmos_db", "redis_cache"];

/// Derives baseline relationships from common architecture patterns
pub fn infer_relationships(components: &[DetectedService]) -> Vec<Relationship> {
    let apps: Vec<&DetectedService> = components
        .iter()
        .filter(|c| c.canonical_type == "app_service")
        .collect();
    let databases: Vec<&DetectedService> = components
        .iter()
        .filter(|c| DATA_STORE_TYPES.contains(&c.canonical_type.as_str()))
        .collect();
    let gateways: Vec<&DetectedService> = components
        .iter()
        .filter(|c| c.canonical_type.contains("gateway"))
        .collect();
    let storage: Vec<&DetectedService> = components
        .iter()
        .filter(|c| c.canonical_type.contains("storage"))
        .collect();

    let mut relationships = Vec::new();

    for app in &apps {
        for db in &databases {
            relationships.push(
                Relationship::new(&app.display_name, &db.display_name, "data_connection")
                    .with_description(format!(
                        "{} connects to {} for data storage",
                        app.display_name, db.display_name
                    )),
            );
        }
    }

    for gateway in &gateways {
        for app in &apps {
            relationships.push(
                Relationship::new(&gateway.display_name, &app.display_name, "traffic_routing")
                    .with_description(format!(
                        "{} routes traffic to {}",
                        gateway.display_name, app.display_name
                    )),
            );
        }
    }

    for app in &apps {
        for stor in &storage {
            relationships.push(
                Relationship::new(&app.display_name, &stor.display_name, "storage_connection")
                    .with_description(format!(
                        "{} uses {} for file storage",
                        app.display_name, stor.display_name
                    )),
            );
        }
    }

    relationships
}
