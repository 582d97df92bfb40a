//! Worker model and wage configuration.
//!
//! This module defines the Worker struct, the Role enum supplied by the
//! external identity collaborator, and the per-worker wage profile consumed
//! by the premium engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The role of an acting user, as supplied by the identity collaborator.
///
/// The engine trusts this input and only enforces workflow-level rules
/// (an employee may only act on their own records).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator: plans shifts, manages workers, may act on any record.
    Admin,
    /// Team lead: may act on any record of their team.
    Teamlead,
    /// Regular worker: may only act on their own records.
    Employee,
}

/// The acting user for a workflow operation.
///
/// Identity and role come from the external authorization layer; the engine
/// never authenticates anyone itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's worker id.
    pub id: String,
    /// The acting user's role.
    pub role: Role,
}

impl Actor {
    /// Returns true if this actor may modify records owned by `worker_id`.
    ///
    /// Admins and team leads may modify any record; employees only their own.
    pub fn may_modify(&self, worker_id: &str) -> bool {
        match self.role {
            Role::Admin | Role::Teamlead => true,
            Role::Employee => self.id == worker_id,
        }
    }

    /// Returns true if this actor holds a planning role.
    pub fn is_planner(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Teamlead)
    }
}

/// One independently toggleable wage surcharge rule.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::SurchargeRule;
/// use rust_decimal::Decimal;
///
/// let night = SurchargeRule { enabled: true, percent: Decimal::from(25) };
/// assert!(night.enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeRule {
    /// Whether this surcharge applies for the worker.
    pub enabled: bool,
    /// Surcharge percentage on top of the base wage (25 means +25%).
    pub percent: Decimal,
}

impl SurchargeRule {
    /// A disabled rule with a zero percentage.
    pub fn off() -> Self {
        Self {
            enabled: false,
            percent: Decimal::ZERO,
        }
    }
}

/// Per-worker wage configuration consumed by the premium engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageProfile {
    /// The base hourly wage.
    pub hourly_wage: Decimal,
    /// Weekly target hours; prorated per month by the overtime calculation.
    pub weekly_hours: Decimal,
    /// Night-hours surcharge rule.
    pub night: SurchargeRule,
    /// Sunday surcharge rule.
    pub sunday: SurchargeRule,
    /// Public-holiday surcharge rule.
    pub holiday: SurchargeRule,
}

/// A personal-assistance worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Identity reference from the external identity collaborator.
    pub id: String,
    /// Display name used in notifications and documents.
    pub display_name: String,
    /// The worker's role.
    pub role: Role,
    /// Contact address for reminders, if any.
    pub email: Option<String>,
    /// Wage configuration for the premium engine.
    pub wage: WageProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> WageProfile {
        WageProfile {
            hourly_wage: Decimal::new(1850, 2), // 18.50
            weekly_hours: Decimal::from(40),
            night: SurchargeRule {
                enabled: true,
                percent: Decimal::from(25),
            },
            sunday: SurchargeRule::off(),
            holiday: SurchargeRule::off(),
        }
    }

    #[test]
    fn test_employee_may_only_modify_own_records() {
        let actor = Actor {
            id: "w1".to_string(),
            role: Role::Employee,
        };
        assert!(actor.may_modify("w1"));
        assert!(!actor.may_modify("w2"));
    }

    #[test]
    fn test_admin_and_teamlead_may_modify_any_record() {
        for role in [Role::Admin, Role::Teamlead] {
            let actor = Actor {
                id: "boss".to_string(),
                role,
            };
            assert!(actor.may_modify("w2"));
            assert!(actor.is_planner());
        }
    }

    #[test]
    fn test_worker_round_trips_through_json() {
        let worker = Worker {
            id: "w1".to_string(),
            display_name: "Ada".to_string(),
            role: Role::Employee,
            email: Some("ada@example.org".to_string()),
            wage: profile(),
        };

        let json = serde_json::to_string(&worker).unwrap();
        let back: Worker = serde_json::from_str(&json).unwrap();
        assert_eq!(worker, back);
    }

    #[test]
    fn test_role_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Role::Teamlead).unwrap();
        assert_eq!(json, "\"teamlead\"");
    }
}
