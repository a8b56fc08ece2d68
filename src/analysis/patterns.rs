//! Tiered detection patterns for platform services
//!
//! Two tiers of regex detectors over lowercased diagram text. High-tier
//! patterns are specific service phrases and carry strong confidence; the
//! medium tier is looser vocabulary consulted only for canonical types the
//! high tier did not already match, so a type hit by both tiers always keeps
//! the higher confidence.

use regex::Regex;

/// Confidence assigned to a high-tier pattern match
pub const HIGH_CONFIDENCE: f32 = 0.9;

/// Confidence assigned to a medium-tier pattern match
pub const MEDIUM_CONFIDENCE: f32 = 0.6;

/// High-tier patterns: (canonical type, regex alternatives).
/// Applied against lowercased text, so the patterns themselves are lowercase.
const HIGH_TIER_PATTERNS: &[(&str, &[&str])] = &[
    (
        "app_service",
        &[
            r"\b(azure\s+)?app\s+services?\b",
            r"\bweb\s?apps?\b",
            r"\bapp\s+svc\b",
        ],
    ),
    (
        "function_app",
        &[
            r"\bfunctions?\s+apps?\b",
            r"\bazure\s+functions?\b",
            r"\bserverless\s+functions?\b",
        ],
    ),
    (
        "virtual_machine",
        &[r"\b(azure\s+)?virtual\s+machines?\b", r"\bvms?\b"],
    ),
    (
        "kubernetes_service",
        &[
            r"\b(azure\s+)?kubernetes(\s+service)?\b",
            r"\baks\b",
            r"\bk8s\b",
        ],
    ),
    (
        "container_instance",
        &[r"\bcontainer\s+instances?\b", r"\baci\b"],
    ),
    (
        "sql_database",
        &[
            r"\b(azure\s+)?sql\s+(database|db|server)s?\b",
            r"\bmssql\b",
        ],
    ),
    ("cosmos_db", &[r"\bcosmos\s*db\b", r"\bdocumentdb\b"]),
    (
        "mysql_database",
        &[r"\b(azure\s+database\s+for\s+)?mysql\b"],
    ),
    (
        "postgresql_database",
        &[r"\b(azure\s+database\s+for\s+)?postgres(ql)?\b"],
    ),
    (
        "redis_cache",
        &[r"\b(azure\s+cache\s+for\s+)?redis\b"],
    ),
    (
        "storage_account",
        &[
            r"\b(azure\s+)?storage\s+accounts?\b",
            r"\bblob\s+storage\b",
            r"\bfile\s+shares?\b",
        ],
    ),
    ("data_lake", &[r"\bdata\s+lake\b", r"\badls\b"]),
    (
        "virtual_network",
        &[r"\bvirtual\s+networks?\b", r"\bvnets?\b"],
    ),
    ("load_balancer", &[r"\bload\s+balanc(er|ers|ing)\b"]),
    (
        "application_gateway",
        &[
            r"\bapplication\s+gateways?\b",
            r"\bapp\s+gateway\b",
            r"\bwaf\b",
        ],
    ),
    (
        "api_management",
        &[r"\bapi\s+management\b", r"\bapim\b", r"\bapi\s+gateway\b"],
    ),
    ("front_door", &[r"\bfront\s+door\b"]),
    ("cdn", &[r"\bcdn\b", r"\bcontent\s+delivery\s+network\b"]),
    ("key_vault", &[r"\bkey\s*vault\b"]),
    (
        "active_directory",
        &[
            r"\bactive\s+directory\b",
            r"\bazure\s+ad\b",
            r"\baad\b",
            r"\bentra(\s+id)?\b",
        ],
    ),
    ("service_bus", &[r"\bservice\s+bus\b"]),
    ("event_hub", &[r"\bevent\s+hubs?\b"]),
    ("event_grid", &[r"\bevent\s+grid\b"]),
    ("logic_app", &[r"\blogic\s+apps?\b"]),
    (
        "application_insights",
        &[r"\bapplication\s+insights\b", r"\bapp\s+insights\b"],
    ),
    ("log_analytics", &[r"\blog\s+analytics\b"]),
    ("synapse_analytics", &[r"\bsynapse\b"]),
    (
        "machine_learning",
        &[r"\bmachine\s+learning\b", r"\bazure\s+ml\b"],
    ),
    ("iot_hub", &[r"\biot\s+hub\b"]),
    ("firewall", &[r"\b(azure\s+)?firewall\b"]),
    ("vpn_gateway", &[r"\bvpn\s+gateway\b"]),
    ("dns_zone", &[r"\bdns\s+zones?\b", r"\bazure\s+dns\b"]),
];

/// Medium-tier patterns: generic vocabulary that only suggests a service.
/// Consulted per type only when the high tier found nothing for it.
const MEDIUM_TIER_PATTERNS: &[(&str, &[&str])] = &[
    ("sql_database", &[r"\bdatabases?\b", r"\bdb\b"]),
    ("storage_account", &[r"\bstorage\b", r"\bblobs?\b"]),
    ("virtual_machine", &[r"\bservers?\b", r"\bcompute\b"]),
    ("kubernetes_service", &[r"\bcontainers?\b", r"\bdocker\b"]),
    ("api_management", &[r"\bapis?\b", r"\brest\b"]),
    ("redis_cache", &[r"\bcach(e|ing)\b"]),
    ("service_bus", &[r"\bqueues?\b", r"\bmessaging\b"]),
    (
        "active_directory",
        &[r"\bauthentication\b", r"\bidentity\b", r"\bsso\b"],
    ),
    (
        "application_insights",
        &[r"\bmonitor(ing)?\b", r"\btelemetry\b"],
    ),
    ("application_gateway", &[r"\bgateway\b"]),
    ("function_app", &[r"\bserverless\b"]),
    ("virtual_network", &[r"\bnetwork\b", r"\bsubnets?\b"]),
    ("key_vault", &[r"\bsecrets?\b", r"\bcertificates?\b"]),
    ("machine_learning", &[r"\bml\b", r"\bcognitive\b"]),
];

/// Closed vocabulary of canonical service identifiers. Detection, synonym
/// normalization, and the AI instruction block all draw from this list.
pub const CANONICAL_SERVICE_TYPES: &[&str] = &[
    "app_service",
    "function_app",
    "virtual_machine",
    "kubernetes_service",
    "container_instance",
    "service_fabric",
    "batch_account",
    "sql_database",
    "cosmos_db",
    "mysql_database",
    "postgresql_database",
    "redis_cache",
    "storage_account",
    "data_lake",
    "managed_disk",
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
    "bastion",
    "key_vault",
    "active_directory",
    "security_center",
    "sentinel",
    "ddos_protection",
    "service_bus",
    "event_hub",
    "event_grid",
    "logic_app",
    "application_insights",
    "log_analytics",
    "azure_monitor",
    "network_watcher",
    "synapse_analytics",
    "data_factory",
    "databricks",
    "machine_learning",
    "cognitive_services",
    "openai_service",
    "iot_hub",
    "digital_twins",
    "devops",
    "automation_account",
];

/// One canonical type with its compiled alternatives
pub struct PatternEntry {
    pub canonical_type: &'static str,
    regexes: Vec<Regex>,
}

impl PatternEntry {
    fn compile(canonical_type: &'static str, sources: &[&str]) -> Self {
        let regexes = sources
            .iter()
            .map(|src| Regex::new(src).expect("built-in detection pattern must compile"))
            .collect();
        Self {
            canonical_type,
            regexes,
        }
    }

    /// Total number of occurrences across all alternatives
    pub fn match_count(&self, lowercase_text: &str) -> u32 {
        self.regexes
            .iter()
            .map(|re| re.find_iter(lowercase_text).count() as u32)
            .sum()
    }
}

/// Both pattern tiers, compiled once and reused across requests
pub struct PatternLibrary {
    high: Vec<PatternEntry>,
    medium: Vec<PatternEntry>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        let high = HIGH_TIER_PATTERNS
            .iter()
            .map(|(canonical, sources)| PatternEntry::compile(canonical, sources))
            .collect();
        let medium = MEDIUM_TIER_PATTERNS
            .iter()
            .map(|(canonical, sources)| PatternEntry::compile(canonical, sources))
            .collect();
        Self { high, medium }
    }

    pub fn high_tier(&self) -> &[PatternEntry] {
        &self.high
    }

    pub fn medium_tier(&self) -> &[PatternEntry] {
        &self.medium
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        let library = PatternLibrary::new();
        assert!(!library.high_tier().is_empty());
        assert!(!library.medium_tier().is_empty());
    }

    #[test]
    fn test_high_tier_types_are_canonical() {
        for (canonical, _) in HIGH_TIER_PATTERNS {
            assert!(
                CANONICAL_SERVICE_TYPES.contains(canonical),
                "{} missing from the canonical vocabulary",
                canonical
            );
        }
        for (canonical, _) in MEDIUM_TIER_PATTERNS {
            assert!(
                CANONICAL_SERVICE_TYPES.contains(canonical),
                "{} missing from the canonical vocabulary",
                canonical
            );
        }
    }

    #[test]
    fn test_high_tier_matches_service_phrases() {
        let library = PatternLibrary::new();
        let text = "we use an app service connected to a sql database and a storage account";

        let hits: Vec<&str> = library
            .high_tier()
            .iter()
            .filter(|entry| entry.match_count(text) > 0)
            .map(|entry| entry.canonical_type)
            .collect();

        assert!(hits.contains(&"app_service"));
        assert!(hits.contains(&"sql_database"));
        assert!(hits.contains(&"storage_account"));
    }

    #[test]
    fn test_word_boundaries_prevent_substring_hits() {
        let library = PatternLibrary::new();
        // "advertisement" must not trigger the azure ad pattern,
        // "government" must not trigger vms
        let text = "an advertisement for government services";

        for entry in library.high_tier() {
            assert_eq!(
                entry.match_count(text),
                0,
                "{} matched unrelated text",
                entry.canonical_type
            );
        }
    }

    #[test]
    fn test_match_count_counts_occurrences() {
        let library = PatternLibrary::new();
        let text = "one storage account here, another storage account there";

        let entry = library
            .high_tier()
            .iter()
            .find(|e| e.canonical_type == "storage_account")
            .unwrap();
        assert_eq!(entry.match_count(text), 2);
    }

    #[test]
    fn test_medium_tier_generic_terms() {
        let library = PatternLibrary::new();
        let text = "the backend talks to a database through an internal network";

        let hits: Vec<&str> = library
            .medium_tier()
            .iter()
            .filter(|entry| entry.match_count(text) > 0)
            .map(|entry| entry.canonical_type)
            .collect();

        assert!(hits.contains(&"sql_database"));
        assert!(hits.contains(&"virtual_network"));
        assert!(!hits.contains(&"key_vault"));
    }

    #[test]
    fn test_abbreviations_hit() {
        let library = PatternLibrary::new();

        let aks = library
            .high_tier()
            .iter()
            .find(|e| e.canonical_type == "kubernetes_service")
            .unwrap();
        assert!(aks.match_count("two aks clusters") > 0);

        let vm = library
            .high_tier()
            .iter()
            .find(|e| e.canonical_type == "virtual_machine")
            .unwrap();
        assert!(vm.match_count("a fleet of vms") > 0);
    }
}
