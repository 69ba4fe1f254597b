//! Workflow definitions: ordered step lists, each owned by a role.

use serde::{Deserialize, Serialize};

use vitach_auth::Role;
use vitach_core::{DomainError, DomainResult, Record, require_non_empty};

/// Who performs a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepActor {
    #[serde(rename = "service")]
    Requester,
    #[serde(rename = "achat")]
    Purchasing,
    #[serde(rename = "dg")]
    Director,
    Maintenance,
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub actor: StepActor,
    #[serde(default)]
    pub status: StepStatus,
    pub order: u32,
    #[serde(default)]
    pub required: bool,
    /// Completing this step puts the next one in progress.
    #[serde(default)]
    pub auto_advance: bool,
}

impl WorkflowStep {
    /// System steps are open to everyone; the DG may act on any step.
    pub fn can_access(&self, role: Role) -> bool {
        match (self.actor, role) {
            (StepActor::System, _) | (_, Role::Director) => true,
            (StepActor::Requester, Role::Requester) | (StepActor::Purchasing, Role::Purchasing) => {
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Record for Workflow {
    const COLLECTION: &'static str = "workflows";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("key", &self.key)?;
        require_non_empty("name", &self.name)?;
        if self.steps.is_empty() {
            return Err(DomainError::validation("a workflow needs at least one step"));
        }
        for step in &self.steps {
            require_non_empty("step key", &step.key)?;
            require_non_empty("step name", &step.name)?;
        }
        Ok(())
    }
}

impl Workflow {
    /// Complete `step_key` on behalf of `role`.
    pub fn advance(&mut self, step_key: &str, role: Role) -> DomainResult<()> {
        let index = self
            .steps
            .iter()
            .position(|s| s.key == step_key)
            .ok_or(DomainError::NotFound)?;

        let step = &mut self.steps[index];
        if !step.can_access(role) {
            return Err(DomainError::Unauthorized);
        }
        if step.status == StepStatus::Completed {
            return Err(DomainError::invariant(format!("step '{step_key}' is already completed")));
        }
        step.status = StepStatus::Completed;

        if step.auto_advance {
            if let Some(next) = self.steps.get_mut(index + 1) {
                next.status = StepStatus::InProgress;
            }
        }
        Ok(())
    }

    /// Completed steps as a rounded percentage.
    pub fn progress(&self) -> u8 {
        if self.steps.is_empty() {
            return 0;
        }
        let done = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        ((done as f64 / self.steps.len() as f64) * 100.0).round() as u8
    }

    /// Built-in workflows seeded at startup.
    pub fn predefined() -> Vec<Workflow> {
        use StepActor::*;

        vec![
            Workflow {
                key: "order_approval".to_string(),
                name: "Workflow d'Approbation des Commandes".to_string(),
                description: "Processus d'approbation des commandes avec validation multi-niveaux"
                    .to_string(),
                steps: vec![
                    step(1, "creation", "Création de la Commande", "Le service crée une nouvelle commande", Requester, StepStatus::Pending, true, false),
                    step(2, "pricing", "Ajout du Prix", "Le service achat ajoute le prix à la commande", Purchasing, StepStatus::Pending, true, false),
                    step(3, "dg_validation", "Validation DG", "Le Directeur Général valide la commande", Director, StepStatus::Pending, true, false),
                    step(4, "execution", "Exécution", "La commande est exécutée et livrée", Purchasing, StepStatus::Pending, true, true),
                ],
                active: true,
            },
            Workflow {
                key: "stock_alert".to_string(),
                name: "Workflow d'Alerte Stock".to_string(),
                description: "Processus automatique de gestion des alertes de stock".to_string(),
                steps: vec![
                    step(1, "detection", "Détection d'Alerte", "Système détecte un stock faible ou rupture", System, StepStatus::Completed, true, true),
                    step(2, "notification", "Notification", "Notification automatique aux responsables", System, StepStatus::Completed, true, true),
                    step(3, "auto_order", "Commande Automatique", "Génération automatique d'une commande de réapprovisionnement", System, StepStatus::Pending, false, false),
                    step(4, "manual_validation", "Validation Manuelle", "Validation manuelle par le service achat", Purchasing, StepStatus::Pending, true, false),
                ],
                active: true,
            },
            Workflow {
                key: "maintenance_planning".to_string(),
                name: "Workflow de Planification Maintenance".to_string(),
                description: "Processus de planification et suivi des maintenances".to_string(),
                steps: vec![
                    step(1, "planning", "Planification", "Planification des maintenances préventives", Maintenance, StepStatus::Pending, true, false),
                    step(2, "budget_approval", "Approbation Budget", "Validation du budget par la direction", Director, StepStatus::Pending, true, false),
                    step(3, "execution", "Exécution", "Exécution des travaux de maintenance", Maintenance, StepStatus::Pending, true, false),
                    step(4, "quality_check", "Validation Qualité", "Contrôle qualité et validation des travaux", Maintenance, StepStatus::Pending, true, false),
                ],
                active: true,
            },
        ]
    }
}

#[allow(clippy::too_many_arguments)]
fn step(
    order: u32,
    key: &str,
    name: &str,
    description: &str,
    actor: StepActor,
    status: StepStatus,
    required: bool,
    auto_advance: bool,
) -> WorkflowStep {
    WorkflowStep {
        key: key.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        actor,
        status,
        order,
        required,
        auto_advance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_approval() -> Workflow {
        Workflow::predefined()
            .into_iter()
            .find(|w| w.key == "order_approval")
            .unwrap()
    }

    #[test]
    fn predefined_workflows_are_valid() {
        let all = Workflow::predefined();
        assert_eq!(all.len(), 3);
        for wf in &all {
            assert!(wf.validate().is_ok(), "{}", wf.key);
        }
        assert_eq!(all[1].progress(), 50);
    }

    #[test]
    fn step_access_follows_owner_role() {
        let wf = order_approval();
        assert!(wf.steps[1].can_access(Role::Purchasing));
        assert!(!wf.steps[1].can_access(Role::Requester));
        assert!(wf.steps[0].can_access(Role::Director));
        assert!(!wf.steps[2].can_access(Role::Purchasing));
    }

    #[test]
    fn advance_completes_step_and_auto_advances() {
        let mut wf = Workflow::predefined().remove(1);
        wf.steps[1].status = StepStatus::Pending;

        wf.advance("notification", Role::Requester).unwrap();
        assert_eq!(wf.steps[1].status, StepStatus::Completed);
        assert_eq!(wf.steps[2].status, StepStatus::InProgress);

        let err = wf.advance("manual_validation", Role::Requester).unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
        assert_eq!(wf.advance("missing", Role::Director).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn manual_steps_do_not_move_the_next_one() {
        let mut wf = order_approval();
        wf.advance("pricing", Role::Purchasing).unwrap();
        assert_eq!(wf.steps[2].status, StepStatus::Pending);
        assert_eq!(wf.progress(), 25);
        assert!(wf.advance("pricing", Role::Director).is_err());
    }
}
