use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use vitach_core::{DocumentId, Stored};
use vitach_parties::ServiceProvider;

use crate::{MaintenanceRecord, Vehicle};

pub const UNKNOWN_VEHICLE: &str = "Véhicule inconnu";
pub const UNKNOWN_PROVIDER: &str = "Prestataire inconnu";

/// A maintenance record with its references replaced by display labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMaintenance {
    #[serde(flatten)]
    pub maintenance: Stored<MaintenanceRecord>,
    pub vehicle_label: String,
    pub provider_name: Option<String>,
    pub days_until_due: i64,
}

/// Join maintenance records with vehicles and providers.
///
/// Dangling references get a placeholder label instead of failing.
pub fn resolve(
    records: Vec<Stored<MaintenanceRecord>>,
    vehicles: &[Stored<Vehicle>],
    providers: &[Stored<ServiceProvider>],
    today: NaiveDate,
) -> Vec<ResolvedMaintenance> {
    let vehicles: HashMap<DocumentId, &Vehicle> =
        vehicles.iter().map(|v| (v.id, &v.record)).collect();
    let providers: HashMap<DocumentId, &ServiceProvider> =
        providers.iter().map(|p| (p.id, &p.record)).collect();

    records
        .into_iter()
        .map(|m| {
            let vehicle_label = vehicles
                .get(&m.record.vehicle_id)
                .map(|v| v.label())
                .unwrap_or_else(|| UNKNOWN_VEHICLE.to_string());
            let provider_name = m.record.provider_id.map(|id| {
                providers
                    .get(&id)
                    .map(|p| p.contact.name.clone())
                    .unwrap_or_else(|| UNKNOWN_PROVIDER.to_string())
            });
            let days_until_due = m.record.days_until_due(today);

            ResolvedMaintenance {
                maintenance: m,
                vehicle_label,
                provider_name,
                days_until_due,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaintenanceStatus, VehicleKind, VehicleStatus};
    use chrono::Utc;
    use vitach_core::{Audit, UserId};
    use vitach_parties::Contact;

    fn stored<R>(record: R) -> Stored<R> {
        Stored {
            id: DocumentId::new(),
            audit: Audit::new(UserId::new(), Utc::now()),
            record,
        }
    }

    #[test]
    fn dangling_references_get_placeholders() {
        let vehicle = stored(Vehicle {
            make: "Toyota".to_string(),
            model: "Hilux".to_string(),
            plate: "RC-1234-A".to_string(),
            year: Some(2019),
            mileage_km: None,
            kind: VehicleKind::Car,
            status: VehicleStatus::Active,
        });
        let provider = stored(ServiceProvider {
            contact: Contact {
                name: "Garage Central".to_string(),
                ..Contact::default()
            },
            avg_lead_time_days: None,
        });

        let record = |vehicle_id, provider_id| {
            stored(MaintenanceRecord {
                vehicle_id,
                provider_id,
                kind: "Vidange".to_string(),
                description: String::new(),
                scheduled_on: "2026-05-12".parse().unwrap(),
                estimated_cost: None,
                status: MaintenanceStatus::Planned,
                notes: String::new(),
            })
        };

        let resolved = resolve(
            vec![
                record(vehicle.id, Some(provider.id)),
                record(DocumentId::new(), Some(DocumentId::new())),
            ],
            &[vehicle],
            &[provider],
            "2026-05-10".parse().unwrap(),
        );

        assert_eq!(resolved[0].vehicle_label, "Toyota Hilux (RC-1234-A)");
        assert_eq!(resolved[0].provider_name.as_deref(), Some("Garage Central"));
        assert_eq!(resolved[0].days_until_due, 2);
        assert_eq!(resolved[1].vehicle_label, UNKNOWN_VEHICLE);
        assert_eq!(resolved[1].provider_name.as_deref(), Some(UNKNOWN_PROVIDER));
    }
}
