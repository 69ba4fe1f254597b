use serde::{Deserialize, Serialize};

use vitach_core::{DomainError, DomainResult, Record, require_non_empty};

/// Contact details shared by suppliers and service providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    /// 0 to 5 stars.
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub comments: String,
}

impl Contact {
    fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)?;
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(DomainError::validation("email is malformed"));
        }
        if let Some(r) = self.rating {
            if !(0.0..=5.0).contains(&r) {
                return Err(DomainError::validation("rating must be between 0 and 5"));
            }
        }
        Ok(())
    }
}

/// Supplier offered to purchasing when an order is priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(flatten)]
    pub contact: Contact,
}

impl Record for Supplier {
    const COLLECTION: &'static str = "suppliers";

    fn validate(&self) -> DomainResult<()> {
        self.contact.validate()
    }
}

/// External provider (garages, technicians) used by maintenance records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProvider {
    #[serde(flatten)]
    pub contact: Contact,
    /// Typical turnaround, in days.
    #[serde(default)]
    pub avg_lead_time_days: Option<u32>,
}

impl Record for ServiceProvider {
    const COLLECTION: &'static str = "providers";

    fn validate(&self) -> DomainResult<()> {
        self.contact.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_reads_flat_json() {
        let supplier: Supplier = serde_json::from_str(
            r#"{"name":"LDLC","email":"pro@ldlc.test","rating":4.5,"city":"Conakry"}"#,
        )
        .unwrap();
        assert_eq!(supplier.contact.name, "LDLC");
        assert!(supplier.validate().is_ok());
    }

    #[test]
    fn rating_and_email_are_checked() {
        let mut provider = ServiceProvider {
            contact: Contact {
                name: "Garage Central".to_string(),
                rating: Some(7.0),
                ..Contact::default()
            },
            avg_lead_time_days: Some(3),
        };
        assert!(provider.validate().is_err());

        provider.contact.rating = Some(3.0);
        provider.contact.email = "garage".to_string();
        assert!(provider.validate().is_err());

        provider.contact.email = "garage@central.test".to_string();
        assert!(provider.validate().is_ok());
    }
}
