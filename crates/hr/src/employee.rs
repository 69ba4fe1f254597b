use serde::{Deserialize, Serialize};

use vitach_core::{DomainError, DomainResult, Record, require_non_empty};

/// Staff directory entry. Not a login account: accounts live with the
/// identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub service: String,
    /// Job title, free text.
    #[serde(default)]
    pub position: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

impl Record for Employee {
    const COLLECTION: &'static str = "employees";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;
        require_non_empty("service", &self.service)?;
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(DomainError::validation("email is malformed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_names_and_service() {
        let employee: Employee = serde_json::from_str(
            r#"{"first_name":"Awa","last_name":"Camara","service":"Logistique"}"#,
        )
        .unwrap();
        assert!(employee.active);
        assert_eq!(employee.full_name(), "Awa Camara");
        assert!(employee.validate().is_ok());

        let nameless = Employee {
            first_name: " ".to_string(),
            ..employee
        };
        assert!(nameless.validate().is_err());
    }
}
