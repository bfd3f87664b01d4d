use crate::calendar::SundayPolicy;
use crate::hours::StandardHours;
use crate::model::{EmployeeId, TemplateId};
use crate::scheduler::SchedError;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Effectif (min, max) attendu sur un créneau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingRequirement {
    pub min: u16,
    pub max: u16,
}

impl StaffingRequirement {
    pub fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }
}

/// Besoin d'effectif pour un jour de semaine, éventuellement limité à un
/// gabarit. Une règle ciblée prime sur une règle générique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingRule {
    pub weekday: Weekday,
    pub min: u16,
    pub max: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateId>,
}

/// Paramètres d'une génération de planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub staffing: Vec<StaffingRule>,
    /// Gabarits à planifier ; vide = tous ceux du roster.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateId>,
    /// Sous-ensemble de salariés ; vide = tous les actifs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employees: Vec<EmployeeId>,
    #[serde(default)]
    pub distribute_hours_evenly: bool,
    #[serde(default)]
    pub respect_preferences: bool,
    #[serde(default)]
    pub fill_preferred_first: bool,
    #[serde(default)]
    pub avoid_consecutive_weekends: bool,
    #[serde(default = "default_max_weekends")]
    pub max_weekends_per_month: u32,
    /// Heures ; 0 désactive la contrainte de repos.
    #[serde(default = "default_min_rest")]
    pub min_rest_between_shifts: f64,
    /// 0 = illimité (défaut).
    #[serde(default = "default_max_consecutive")]
    pub max_consecutive_work_days: u32,
    #[serde(default)]
    pub sunday_policy: SundayPolicy,
    /// Planifie aussi les jours fériés et dimanches non commerciaux.
    #[serde(default)]
    pub include_non_working_days: bool,
    /// Intègre les shifts déjà présents dans les statistiques d'heures.
    #[serde(default)]
    pub include_existing_in_stats: bool,
    #[serde(default)]
    pub hours: StandardHours,
}

fn default_max_weekends() -> u32 {
    2
}

fn default_min_rest() -> f64 {
    11.0
}

fn default_max_consecutive() -> u32 {
    0
}

impl GenerationConfig {
    /// Configuration neutre sur [start, end] : aucun besoin explicite,
    /// aucune option activée, repos minimal par défaut, série illimitée.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            staffing: Vec::new(),
            templates: Vec::new(),
            employees: Vec::new(),
            distribute_hours_evenly: false,
            respect_preferences: false,
            fill_preferred_first: false,
            avoid_consecutive_weekends: false,
            max_weekends_per_month: default_max_weekends(),
            min_rest_between_shifts: default_min_rest(),
            max_consecutive_work_days: default_max_consecutive(),
            sunday_policy: SundayPolicy::default(),
            include_non_working_days: false,
            include_existing_in_stats: false,
            hours: StandardHours::default(),
        }
    }

    /// Même besoin tous les jours de la semaine, pour tous les gabarits.
    pub fn with_daily_staffing(mut self, min: u16, max: u16) -> Self {
        self.staffing = WEEK
            .iter()
            .map(|&weekday| StaffingRule {
                weekday,
                min,
                max,
                template: None,
            })
            .collect();
        self
    }

    /// Besoin applicable ; `None` si aucune règle ne couvre ce jour.
    pub fn requirement(&self, weekday: Weekday, template: &TemplateId) -> Option<StaffingRequirement> {
        let targeted = self
            .staffing
            .iter()
            .find(|r| r.weekday == weekday && r.template.as_ref() == Some(template));
        let generic = || {
            self.staffing
                .iter()
                .find(|r| r.weekday == weekday && r.template.is_none())
        };
        targeted
            .or_else(generic)
            .map(|r| StaffingRequirement::new(r.min, r.max))
    }

    /// Vérifications structurelles : une erreur ici rend la génération
    /// impossible.
    pub fn validate(&self) -> Result<(), SchedError> {
        if self.start_date > self.end_date {
            return Err(SchedError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if let Some(rule) = self.staffing.iter().find(|r| r.min > r.max) {
            return Err(SchedError::InvalidStaffing {
                weekday: rule.weekday,
                min: rule.min,
                max: rule.max,
            });
        }
        if !self.min_rest_between_shifts.is_finite() || self.min_rest_between_shifts < 0.0 {
            return Err(SchedError::InvalidSetting(
                "min_rest_between_shifts must be a non-negative number",
            ));
        }
        Ok(())
    }
}

pub(crate) const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<GenerationConfig> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: GenerationConfig = serde_json::from_slice(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub fn export_config_json<P: AsRef<Path>>(path: P, config: &GenerationConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
