use serde::{Deserialize, Serialize};

use vitach_core::{DomainResult, Record, require_non_empty};

/// Catalogue entry that orders can reference by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl Record for Article {
    const COLLECTION: &'static str = "articles";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_on_load() {
        let article: Article = serde_json::from_str(r#"{"name":"Ramette A4"}"#).unwrap();
        assert_eq!(article.code, "");
        assert!(article.validate().is_ok());
    }
}
