//! Application-facing view of the configuration file.

use serde::de::DeserializeOwned;
use toml::Table;

/// Read access to arbitrary `[section] key = value` entries.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    table: Table,
}

impl AppConfig {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Value of `key` in `section`, or `default` when missing or of another type.
    pub fn get<T: DeserializeOwned>(&self, section: &str, key: &str, default: T) -> T {
        self.table
            .get(section)
            .and_then(|section| section.get(key))
            .and_then(|value| value.clone().try_into().ok())
            .unwrap_or(default)
    }

    pub fn section(&self, name: &str) -> Option<&Table> {
        self.table.get(name).and_then(toml::Value::as_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::new(
            r#"
            [site]
            name = "Clipart"
            per_page = 24
            tags = ["a", "b"]
            "#
            .parse()
            .unwrap(),
        )
    }

    #[test]
    fn test_get_typed_values() {
        let config = config();
        assert_eq!(config.get("site", "name", String::new()), "Clipart");
        assert_eq!(config.get("site", "per_page", 10u32), 24);
        assert_eq!(config.get("site", "tags", Vec::<String>::new()), vec!["a", "b"]);
    }

    #[test]
    fn test_get_falls_back_to_default() {
        let config = config();
        assert_eq!(config.get("site", "missing", 7), 7);
        assert_eq!(config.get("nope", "name", "x".to_string()), "x");
        assert_eq!(config.get("site", "name", 0u32), 0);
    }

    #[test]
    fn test_section() {
        assert!(config().section("site").is_some());
        assert!(config().section("other").is_none());
    }
}
