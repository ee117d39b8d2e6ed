use serde::{Deserialize, Serialize};

/// A named bucket in the tenant's pipeline.
///
/// Stage configuration lives on the backend and varies per tenant; when a
/// tenant has none configured the client falls back to the standard roofing
/// pipeline from [`fallback_stages`]. Column order on the board follows
/// `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Stable key stored in entry statuses (e.g. "inspection")
    pub key: String,
    /// Human label shown as the column header (e.g. "Inspection")
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}

impl Stage {
    pub fn new(key: &str, label: &str, color: Option<&str>, icon: Option<&str>, sort_order: i64) -> Self {
        Stage {
            key: key.to_string(),
            label: label.to_string(),
            color: color.map(|c| c.to_string()),
            icon: icon.map(|i| i.to_string()),
            sort_order,
        }
    }
}

/// The standard roofing pipeline, used whenever the tenant has no stage
/// configuration of its own.
pub fn fallback_stages() -> Vec<Stage> {
    vec![
        Stage::new("lead", "Lead", Some("blue"), Some("📞"), 1),
        Stage::new("inspection", "Inspection", Some("cyan"), Some("🔍"), 2),
        Stage::new("legal", "Legal Review", Some("magenta"), Some("⚖"), 3),
        Stage::new("contract", "Contract", Some("yellow"), Some("✍"), 4),
        Stage::new("production", "Production", Some("bright_red"), Some("🔨"), 5),
        Stage::new("billing", "Billing", Some("green"), Some("💰"), 6),
        Stage::new("closed", "Closed", Some("bright_black"), Some("✓"), 7),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_new() {
        let stage = Stage::new("legal", "Legal Review", Some("magenta"), None, 3);
        assert_eq!(stage.key, "legal");
        assert_eq!(stage.label, "Legal Review");
        assert_eq!(stage.color.as_deref(), Some("magenta"));
        assert!(stage.icon.is_none());
        assert_eq!(stage.sort_order, 3);
    }

    #[test]
    fn test_fallback_stages_ordered_and_unique() {
        let stages = fallback_stages();
        assert_eq!(stages.len(), 7);
        for pair in stages.windows(2) {
            assert!(pair[0].sort_order < pair[1].sort_order);
        }
        let mut keys: Vec<&str> = stages.iter().map(|s| s.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn test_fallback_covers_sales_and_production() {
        let stages = fallback_stages();
        let has = |k: &str| stages.iter().any(|s| s.key == k);
        assert!(has("lead"));
        assert!(has("legal"));
        assert!(has("production"));
        assert!(has("closed"));
    }

    #[test]
    fn test_stage_deserializes_with_sparse_fields() {
        let json = r#"{"key": "warranty", "label": "Warranty"}"#;
        let stage: Stage = serde_json::from_str(json).unwrap();
        assert_eq!(stage.key, "warranty");
        assert!(stage.color.is_none());
        assert_eq!(stage.sort_order, 0);
    }

    #[test]
    fn test_stage_wire_names_are_camel_case() {
        let stage = Stage::new("lead", "Lead", Some("blue"), None, 1);
        let value = serde_json::to_value(&stage).unwrap();
        assert!(value.get("sortOrder").is_some());
        assert!(value.get("sort_order").is_none());
    }
}
