mod conflicts;
mod generator;
mod mutate;
mod report;
mod types;
mod util;
pub mod validator;

pub use mutate::ShiftRequest;
pub use types::{
    AssignOptions, Conflict, ConflictKind, GenerationResult, GenerationStats, HoursTarget,
    SchedError, ShortfallCause, SkippedDay, UnfilledSlot,
};
pub use validator::AssignmentSet;

use crate::calendar::{CalendarOracle, HolidayCalendar, PolishHolidays, SundayPolicy};
use crate::config::GenerationConfig;
use crate::hours::{self, HoursPolicy};
use crate::model::{
    Absence, Employee, EmployeeId, EmployeePreferences, Roster, Shift, ShiftId, ShiftTemplate,
};
use std::collections::BTreeMap;

/// Scheduler : encapsule un Roster et les politiques de calendrier.
///
/// La génération ne modifie jamais le roster ; le résultat est à appliquer
/// par l'appelant (voir `Changeset`).
#[derive(Debug)]
pub struct Scheduler {
    roster: Roster,
    holidays: Box<dyn HolidayCalendar>,
    hours_policy: Option<Box<dyn HoursPolicy>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::from_roster(Roster::default())
    }

    pub fn from_roster(roster: Roster) -> Self {
        Self {
            roster,
            holidays: Box::new(PolishHolidays),
            hours_policy: None,
        }
    }

    pub fn with_holidays<H: HolidayCalendar + 'static>(mut self, holidays: H) -> Self {
        self.holidays = Box::new(holidays);
        self
    }

    /// Remplace la politique horaire de la configuration.
    pub fn with_hours_policy<P: HoursPolicy + 'static>(mut self, policy: P) -> Self {
        self.hours_policy = Some(Box::new(policy));
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
    pub fn into_roster(self) -> Roster {
        self.roster
    }

    pub fn holidays(&self) -> &dyn HolidayCalendar {
        self.holidays.as_ref()
    }

    pub(crate) fn hours_policy_or<'a>(&'a self, fallback: &'a dyn HoursPolicy) -> &'a dyn HoursPolicy {
        match self.hours_policy.as_deref() {
            Some(policy) => policy,
            None => fallback,
        }
    }

    pub fn add_employees(&mut self, employees: Vec<Employee>) {
        self.roster.employees.extend(employees);
    }

    pub fn add_templates(&mut self, templates: Vec<ShiftTemplate>) {
        self.roster.templates.extend(templates);
    }

    pub fn add_absences(&mut self, absences: Vec<Absence>) {
        self.roster.absences.extend(absences);
    }

    /// Remplace ou ajoute les préférences d'un salarié.
    pub fn set_preferences(&mut self, preferences: EmployeePreferences) {
        self.roster
            .preferences
            .retain(|p| p.employee_id != preferences.employee_id);
        self.roster.preferences.push(preferences);
    }

    /// Génère les affectations de la période configurée.
    pub fn generate(&self, config: &GenerationConfig) -> Result<GenerationResult, SchedError> {
        generator::generate(self, config)
    }

    /// Valide un ajout manuel sans rien modifier.
    pub fn propose(&self, request: &ShiftRequest, opts: AssignOptions) -> Result<Shift, SchedError> {
        mutate::propose(self, request, opts)
    }

    /// Valide puis ajoute un shift au roster (statut `new`).
    pub fn add_shift(&mut self, request: &ShiftRequest, opts: AssignOptions) -> Result<ShiftId, SchedError> {
        let shift = self.propose(request, opts)?;
        let id = shift.id.clone();
        self.roster.shifts.push(shift);
        Ok(id)
    }

    pub fn detect_conflicts(&self, opts: AssignOptions) -> Vec<Conflict> {
        conflicts::detect_conflicts(self, opts)
    }

    /// Objectif horaire d'un salarié pour un mois.
    pub fn required_hours(
        &self,
        employee: &Employee,
        year: i32,
        month: u32,
        sundays: &SundayPolicy,
        policy: &dyn HoursPolicy,
    ) -> f64 {
        let oracle = CalendarOracle::new(self.holidays.as_ref(), sundays);
        let policy = self.hours_policy_or(policy);
        hours::required_hours_for(employee, year, month, &oracle, policy)
    }
}

/// Point d'entrée autonome : génère un planning à partir des seules
/// données fournies, sans shift préexistant, avec le calendrier polonais.
pub fn generate(
    config: &GenerationConfig,
    employees: &[Employee],
    preferences: &BTreeMap<EmployeeId, EmployeePreferences>,
    templates: &[ShiftTemplate],
    absences: &[Absence],
) -> Result<GenerationResult, SchedError> {
    let roster = Roster {
        employees: employees.to_vec(),
        preferences: preferences
            .iter()
            .map(|(id, p)| EmployeePreferences {
                employee_id: id.clone(),
                ..p.clone()
            })
            .collect(),
        templates: templates.to_vec(),
        absences: absences.to_vec(),
        shifts: Vec::new(),
    };
    Scheduler::from_roster(roster).generate(config)
}
