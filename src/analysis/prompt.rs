//! Prompts for LLM-based architecture analysis

use super::types::DetectedService;

/// System prompt for the single rich analysis call
pub const SYSTEM_PROMPT: &str = "You are an expert Azure architect. Analyze architecture diagrams quickly and accurately. Focus on identifying Azure services, their configurations, and key relationships. Provide structured JSON output.";

/// System prompt for the confirmatory call of the hybrid strategy
pub const HYBRID_SYSTEM_PROMPT: &str = "You are an expert Azure architect focused on validating and enhancing component detection with high accuracy.";

/// Diagram text beyond this many characters is truncated before prompting
pub const MAX_PROMPT_TEXT_LEN: usize = 4000;

/// Context window for the hybrid confirmation prompt
pub const HYBRID_CONTEXT_LEN: usize = 3000;

const SERVICE_REFERENCE: &str = r#"AZURE SERVICES REFERENCE GUIDE:
COMPUTE:
- Virtual Machines: VM, Windows Server, Linux -> "virtual_machine"
- App Service: Web App, webapp -> "app_service"
- Azure Functions: Functions, serverless -> "function_app"
- AKS: Kubernetes, K8s -> "kubernetes_service"
- Container Instances: ACI -> "container_instance"

STORAGE:
- Storage Account: Blob Storage, File Storage -> "storage_account"
- Data Lake: ADLS, Data Lake Storage -> "data_lake"
- Managed Disks: Premium SSD, Standard HDD -> "managed_disk"

NETWORKING:
- Virtual Network: VNet -> "virtual_network"
- Application Gateway: App Gateway, WAF -> "application_gateway"
- Load Balancer: LB -> "load_balancer"
- VPN Gateway: Site-to-Site VPN -> "vpn_gateway"
- ExpressRoute: Dedicated connection -> "expressroute"
- Front Door: global entry point -> "front_door"
- CDN: Content Delivery Network -> "cdn"
- Firewall: Azure Firewall -> "firewall"
- DNS: DNS Zone -> "dns_zone"

DATABASES:
- SQL Database: Azure SQL, SQL DB -> "sql_database"
- Cosmos DB: NoSQL, DocumentDB -> "cosmos_db"
- PostgreSQL: PostgreSQL DB -> "postgresql_database"
- MySQL: MySQL DB -> "mysql_database"
- Redis Cache: Redis -> "redis_cache"

SECURITY & IDENTITY:
- Active Directory: AAD, Azure AD, Entra ID -> "active_directory"
- Key Vault: Secrets, Keys -> "key_vault"
- Security Center: Defender for Cloud -> "security_center"
- Sentinel: SIEM -> "sentinel"
- Bastion: jump host -> "bastion"

INTEGRATION:
- Service Bus: Messaging -> "service_bus"
- Event Hubs: Event streaming -> "event_hub"
- Event Grid: Event routing -> "event_grid"
- API Management: APIM, API Gateway -> "api_management"
- Logic Apps: Workflow -> "logic_app"

ANALYTICS & AI:
- Data Factory: ETL, ADF -> "data_factory"
- Synapse Analytics: Data Warehouse -> "synapse_analytics"
- Databricks: Spark -> "databricks"
- Machine Learning: Azure ML -> "machine_learning"
- Cognitive Services: AI services -> "cognitive_services"
- OpenAI Service: Azure OpenAI -> "openai_service"

IOT:
- IoT Hub: Device management -> "iot_hub"
- Digital Twins: device models -> "digital_twins"

MANAGEMENT & MONITORING:
- Azure Monitor: Monitoring -> "azure_monitor"
- Application Insights: App Insights -> "application_insights"
- Log Analytics: Log workspace -> "log_analytics"
- Azure DevOps: CI/CD -> "devops""#;

const RESPONSE_SHAPE: &str = r#"{
    "components": [
        {
            "name": "specific_service_name",
            "type": "exact_service_type_from_reference",
            "category": "compute|storage|network|database|security|monitoring|integration|analytics|ai|iot|management|other",
            "confidence": 0.9
        }
    ],
    "relationships": [
        {
            "source": "source_service_name",
            "target": "target_service_name",
            "type": "connection_type",
            "description": "optional short description"
        }
    ],
    "network_topology": {
        "vnets": ["vnet_names_if_mentioned"],
        "subnets": ["subnet_names_if_mentioned"]
    },
    "summary": "One sentence summary of the architecture"
}"#;

/// Builds the single rich analysis prompt for the AI-enhanced strategy
pub fn build_analysis_prompt(text: &str) -> String {
    let content = truncated_text(text, MAX_PROMPT_TEXT_LEN);
    format!(
        "You are analyzing an Azure architecture diagram. Extract Azure services with maximum accuracy.\n\n\
         {SERVICE_REFERENCE}\n\n\
         ARCHITECTURE CONTENT TO ANALYZE:\n{content}\n\n\
         CRITICAL INSTRUCTIONS:\n\
         1. Use EXACT service type names with underscores (e.g., \"app_service\" not \"app service\")\n\
         2. Check for service names in labels, tooltips, and legends\n\
         3. Identify connection lines showing data flow\n\
         4. Only include services that are actually present in the content\n\n\
         Respond with ONLY this JSON structure (no additional text):\n{RESPONSE_SHAPE}\n\n\
         CRITICAL: Use exact service type names from the reference guide. Be precise and comprehensive."
    )
}

/// Builds the confirmation prompt for the parallel-hybrid strategy, seeded
/// with what the heuristics already found
pub fn build_hybrid_prompt(text: &str, detected: &[DetectedService]) -> String {
    let component_list = if detected.is_empty() {
        "- (none detected so far)".to_string()
    } else {
        detected
            .iter()
            .map(|c| format!("- {} ({})", c.display_name, c.canonical_type))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let context = truncated_text(text, HYBRID_CONTEXT_LEN);

    format!(
        "Review and enhance this list of detected Azure components from an architecture diagram.\n\n\
         DETECTED COMPONENTS:\n{component_list}\n\n\
         ARCHITECTURE CONTEXT:\n{context}\n\n\
         TASKS:\n\
         1. Validate each detected component (is it actually present in the architecture?)\n\
         2. Identify any missing Azure services that should be included\n\
         3. Determine relationships between components\n\
         4. Identify network topology\n\n\
         Respond with ONLY this JSON structure (no additional text):\n{RESPONSE_SHAPE}\n\n\
         IMPORTANT: Only include components that are actually present. Add missing components only if clearly indicated."
    )
}

/// Truncates to `max_chars` characters, appending a marker when cut.
/// Counts characters rather than bytes so multibyte diagram text cannot
/// split a code point.
fn truncated_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("... [truncated for performance]");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{DetectionSource, ServiceCategory};

    #[test]
    fn test_analysis_prompt_carries_text_and_vocabulary() {
        let prompt = build_analysis_prompt("web app talking to a sql database");

        assert!(prompt.contains("web app talking to a sql database"));
        assert!(prompt.contains("\"app_service\""));
        assert!(prompt.contains("\"sql_database\""));
        assert!(prompt.contains("\"network_topology\""));
        assert!(!prompt.contains("[truncated"));
    }

    #[test]
    fn test_analysis_prompt_truncates_long_text() {
        let long_text = "azure ".repeat(2000);
        let prompt = build_analysis_prompt(&long_text);

        assert!(prompt.contains("... [truncated for performance]"));
        // the embedded content stops at the cap
        assert!(!prompt.contains(&long_text));
    }

    #[test]
    fn test_truncation_is_character_based() {
        let multibyte = "é".repeat(5000);
        let cut = truncated_text(&multibyte, MAX_PROMPT_TEXT_LEN);

        assert!(cut.starts_with('é'));
        assert_eq!(
            cut.chars().count(),
            MAX_PROMPT_TEXT_LEN + "... [truncated for performance]".chars().count()
        );
    }

    #[test]
    fn test_hybrid_prompt_lists_detected_components() {
        let detected = vec![DetectedService::new(
            "app_service",
            ServiceCategory::Compute,
            0.9,
            2,
            DetectionSource::Pattern,
        )];
        let prompt = build_hybrid_prompt("some diagram text", &detected);

        assert!(prompt.contains("- App Service (app_service)"));
        assert!(prompt.contains("some diagram text"));
        assert!(prompt.contains("DETECTED COMPONENTS:"));
    }

    #[test]
    fn test_hybrid_prompt_with_no_detections() {
        let prompt = build_hybrid_prompt("text", &[]);
        assert!(prompt.contains("(none detected so far)"));
    }
}
