//! Access-check declaration parsing.
//!
//! A declaration is a `|`-separated list of checks; each check is a name
//! optionally followed by `:`-separated string parameters.

use std::fmt;

/// One declared check: `hasRole:admin:editor` → `hasRole`, `["admin", "editor"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSpec {
    pub name: String,
    pub params: Vec<String>,
}

impl fmt::Display for CheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for param in &self.params {
            write!(f, ":{param}")?;
        }
        Ok(())
    }
}

/// Ordered checks attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckChain(Vec<CheckSpec>);

impl CheckChain {
    /// Parse a declaration. `None` and the empty string give an empty chain;
    /// segments with an empty name are skipped.
    pub fn parse(declaration: Option<&str>) -> Self {
        let Some(declaration) = declaration else {
            return Self::default();
        };

        let checks = declaration
            .split('|')
            .filter_map(|segment| {
                let mut parts = segment.trim().split(':');
                let name = parts.next()?.trim();
                if name.is_empty() {
                    return None;
                }
                Some(CheckSpec {
                    name: name.to_string(),
                    params: parts.map(str::to_string).collect(),
                })
            })
            .collect();

        Self(checks)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckSpec> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|check| check.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_and_params() {
        let chain = CheckChain::parse(Some("loginRequired|hasRole:admin:editor"));
        assert_eq!(chain.len(), 2);

        let checks: Vec<_> = chain.iter().collect();
        assert_eq!(checks[0].name, "loginRequired");
        assert!(checks[0].params.is_empty());
        assert_eq!(checks[1].name, "hasRole");
        assert_eq!(checks[1].params, vec!["admin", "editor"]);
    }

    #[test]
    fn test_empty_declarations() {
        assert!(CheckChain::parse(None).is_empty());
        assert!(CheckChain::parse(Some("")).is_empty());
        assert!(CheckChain::parse(Some("|")).is_empty());
    }

    #[test]
    fn test_empty_segments_skipped() {
        let chain = CheckChain::parse(Some("a||b:2|"));
        assert_eq!(chain.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_display() {
        let chain = CheckChain::parse(Some("b:2:x"));
        assert_eq!(chain.iter().next().unwrap().to_string(), "b:2:x");
    }
}
