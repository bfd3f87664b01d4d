use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Espace de noms des identifiants de shifts générés (UUID v5).
const SHIFT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93b7_4d0c_8e55_1f0a_7c3d_b29e);

/// Identifiant fort pour Employee
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type de contrat, pilote l'objectif d'heures mensuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentType {
    #[default]
    Full,
    Half,
    Custom,
}

impl FromStr for EmploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "full_time" | "etat" => Ok(Self::Full),
            "half" | "half_time" | "1/2" => Ok(Self::Half),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown employment type: {other}")),
        }
    }
}

/// Salarié planifiable. Immuable pendant une génération.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub employment: EmploymentType,
    /// Objectif mensuel explicite, pour `EmploymentType::Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_hours: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Employee {
    pub fn new<I: AsRef<str>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: EmployeeId::new(id),
            name: name.into(),
            employment: EmploymentType::Full,
            custom_hours: None,
            weekly_hours: None,
            active: true,
        }
    }

    pub fn with_employment(mut self, employment: EmploymentType) -> Self {
        self.employment = employment;
        self
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time of day {0:?}: expected HH:MM or HH:MM:SS")]
pub struct TimeParseError(pub String);

/// Heure murale, stockée en minutes depuis minuit (0..1440).
///
/// Seule la frontière (serde, CSV, affichage) manipule des chaînes ;
/// `HH:MM` et `HH:MM:SS` sont acceptés en entrée, `HH:MM:SS` est émis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < Self::MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour.checked_mul(60)?.checked_add(minute)?)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let time = NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map_err(|_| TimeParseError(s.to_string()))?;
        let minutes = time.num_seconds_from_midnight() / 60;
        Ok(Self(minutes as u16))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:00", self.0 / 60, self.0 % 60)
    }
}

/// Identifiant fort pour ShiftTemplate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tranche horaire grossière d'un créneau, pour le matching de préférences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShiftTimePreference {
    #[default]
    Flexible,
    Morning,
    Afternoon,
    Evening,
}

/// Gabarit de créneau (heures murales). `end < start` = créneau de nuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub id: TemplateId,
    pub name: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    #[serde(default)]
    pub break_minutes: u16,
    #[serde(default = "default_capacity")]
    pub capacity: u16,
    #[serde(default)]
    pub is_default: bool,
}

fn default_capacity() -> u16 {
    1
}

impl ShiftTemplate {
    pub fn new<I: AsRef<str>, N: Into<String>>(
        id: I,
        name: N,
        start: TimeOfDay,
        end: TimeOfDay,
        break_minutes: u16,
    ) -> Self {
        Self {
            id: TemplateId::new(id),
            name: name.into(),
            start,
            end,
            break_minutes,
            capacity: 1,
            is_default: false,
        }
    }

    pub fn is_overnight(&self) -> bool {
        self.end <= self.start
    }

    /// Durée travaillée en heures (pause déduite, jamais négative).
    pub fn duration_hours(&self) -> f64 {
        crate::hours::shift_duration_hours(self.start, self.end, self.break_minutes)
    }

    /// Matin avant 12h, après-midi avant 18h, soir ensuite.
    pub fn time_of_day(&self) -> ShiftTimePreference {
        match self.start.hour() {
            0..=11 => ShiftTimePreference::Morning,
            12..=17 => ShiftTimePreference::Afternoon,
            _ => ShiftTimePreference::Evening,
        }
    }
}

/// Préférences individuelles. Absence d'enregistrement = neutre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePreferences {
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub shift_time: ShiftTimePreference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_days: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable_days: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours_per_week: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_consecutive_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rest_hours: Option<f64>,
}

impl EmployeePreferences {
    pub fn neutral(employee_id: EmployeeId) -> Self {
        Self {
            employee_id,
            shift_time: ShiftTimePreference::Flexible,
            preferred_days: Vec::new(),
            unavailable_days: Vec::new(),
            max_hours_per_week: None,
            max_consecutive_days: None,
            min_rest_hours: None,
        }
    }

    pub fn is_unavailable_on(&self, weekday: Weekday) -> bool {
        self.unavailable_days.contains(&weekday)
    }

    /// Nombre de critères de préférence satisfaits (0..=2).
    pub fn match_score(&self, weekday: Weekday, template: &ShiftTemplate) -> u8 {
        let day = u8::from(self.preferred_days.contains(&weekday));
        let time = u8::from(
            self.shift_time != ShiftTimePreference::Flexible
                && self.shift_time == template.time_of_day(),
        );
        day + time
    }
}

/// Indisponibilité sur l'intervalle de dates inclusif [start, end].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub employee_id: EmployeeId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Absence {
    pub fn new(employee_id: EmployeeId, start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("absence end must not be before start".to_string());
        }
        Ok(Self {
            employee_id,
            start,
            end,
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Identifiant fort pour Shift
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    /// Identifiant stable d'un créneau généré : même entrée, même id.
    pub fn for_slot(date: NaiveDate, template: &TemplateId, employee: &EmployeeId) -> Self {
        let key = format!("{date}|{}|{}", template.as_str(), employee.as_str());
        Self(Uuid::new_v5(&SHIFT_NAMESPACE, key.as_bytes()).to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// État local d'un shift avant commit vers le stockage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    #[default]
    New,
    Modified,
    Deleted,
    Unchanged,
}

/// Affectation concrète d'un salarié à un créneau daté.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    #[serde(default)]
    pub break_minutes: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub status: ShiftStatus,
}

impl Shift {
    /// Instancie un gabarit pour un salarié et une date (statut `new`).
    pub fn from_template(template: &ShiftTemplate, employee: &EmployeeId, date: NaiveDate) -> Self {
        Self {
            id: ShiftId::for_slot(date, &template.id, employee),
            employee_id: employee.clone(),
            date,
            start: template.start,
            end: template.end,
            break_minutes: template.break_minutes,
            template_id: Some(template.id.clone()),
            notes: None,
            color: None,
            status: ShiftStatus::New,
        }
    }

    pub fn duration_hours(&self) -> f64 {
        crate::hours::shift_duration_hours(self.start, self.end, self.break_minutes)
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ShiftStatus::Deleted
    }

    /// Égalité de contenu, statut ignoré.
    pub fn same_content(&self, other: &Shift) -> bool {
        self.id == other.id
            && self.employee_id == other.employee_id
            && self.date == other.date
            && self.start == other.start
            && self.end == other.end
            && self.break_minutes == other.break_minutes
            && self.template_id == other.template_id
            && self.notes == other.notes
            && self.color == other.color
    }
}

/// Planning complet (données persistées par `Storage`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub preferences: Vec<EmployeePreferences>,
    #[serde(default)]
    pub templates: Vec<ShiftTemplate>,
    #[serde(default)]
    pub absences: Vec<Absence>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
}

impl Roster {
    pub fn find_employee<'a>(&'a self, id: &EmployeeId) -> Option<&'a Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }
    pub fn find_template<'a>(&'a self, id: &TemplateId) -> Option<&'a ShiftTemplate> {
        self.templates.iter().find(|t| &t.id == id)
    }
    pub fn preferences_for<'a>(&'a self, id: &EmployeeId) -> Option<&'a EmployeePreferences> {
        self.preferences.iter().find(|p| &p.employee_id == id)
    }
    pub fn find_shift_mut(&mut self, id: &ShiftId) -> Option<&mut Shift> {
        self.shifts.iter_mut().find(|s| &s.id == id)
    }
    pub fn is_absent(&self, id: &EmployeeId, date: NaiveDate) -> bool {
        self.absences
            .iter()
            .any(|a| &a.employee_id == id && a.covers(date))
    }
    /// Shifts effectifs (hors `deleted`).
    pub fn live_shifts(&self) -> impl Iterator<Item = &Shift> {
        self.shifts.iter().filter(|s| !s.is_deleted())
    }
}
