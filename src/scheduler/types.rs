use crate::model::{EmployeeId, Shift, ShiftId, TemplateId};
use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Options du chemin interactif (ajout d'un shift à la main).
#[derive(Debug, Clone, Copy)]
pub struct AssignOptions {
    pub min_rest_hours: f64,
    /// 0 = illimité.
    pub max_consecutive_days: u32,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            min_rest_hours: 11.0,
            max_consecutive_days: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Overlap,
    DoubleAssignment,
    RestViolation,
    ConsecutiveDays,
    Absent,
    Inactive,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConflictKind::Overlap => "overlaps an existing shift",
            ConflictKind::DoubleAssignment => "already assigned to this slot",
            ConflictKind::RestViolation => "minimum rest not respected",
            ConflictKind::ConsecutiveDays => "too many consecutive work days",
            ConflictKind::Absent => "employee is absent",
            ConflictKind::Inactive => "employee is inactive",
        };
        f.write_str(text)
    }
}

/// Conflit détecté entre deux shifts d'un même salarié.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub employee: EmployeeId,
    pub shift_a: ShiftId,
    pub shift_b: ShiftId,
    pub kind: ConflictKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid staffing for {weekday}: min {min} exceeds max {max}")]
    InvalidStaffing { weekday: Weekday, min: u16, max: u16 },
    #[error("invalid setting: {0}")]
    InvalidSetting(&'static str),
    #[error("no active employee to schedule")]
    NoEmployees,
    #[error("no shift template to schedule")]
    NoTemplates,
    #[error("invalid template {0}: start and end must differ")]
    InvalidTemplate(String),
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),
    #[error("assignment rejected: {0}")]
    Conflict(ConflictKind),
}

/// Première cause bloquante rencontrée pour un créneau sous-doté.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallCause {
    NoEligibleEmployees,
    Unavailable,
    AlreadyWorking,
    TimeConflict,
    DuplicateSlot,
    RestPeriod,
    ConsecutiveDays,
    WeekendSpacing,
    WeeklyHours,
}

impl fmt::Display for ShortfallCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ShortfallCause::NoEligibleEmployees => "no eligible employees remaining",
            ShortfallCause::Unavailable => "candidates excluded by absence or unavailability",
            ShortfallCause::AlreadyWorking => "candidates already working that day",
            ShortfallCause::TimeConflict => "candidates excluded by overlapping shifts",
            ShortfallCause::DuplicateSlot => "candidates already hold this slot",
            ShortfallCause::RestPeriod => "all candidates excluded by rest constraint",
            ShortfallCause::ConsecutiveDays => "candidates excluded by consecutive-day limit",
            ShortfallCause::WeekendSpacing => "candidates excluded by weekend spacing",
            ShortfallCause::WeeklyHours => "candidates excluded by weekly hour limit",
        };
        f.write_str(text)
    }
}

/// Créneau (date, gabarit) resté sous son effectif minimum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnfilledSlot {
    pub date: NaiveDate,
    pub template_id: TemplateId,
    pub required: u16,
    pub assigned: u16,
    pub cause: ShortfallCause,
    pub reason: String,
}

/// Date écartée de la génération.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDay {
    pub date: NaiveDate,
    pub reason: String,
}

/// Objectif mensuel vs heures planifiées pour un salarié.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursTarget {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub month: u32,
    pub required: f64,
    pub scheduled: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct GenerationStats {
    pub total_shifts: usize,
    pub hours_per_employee: BTreeMap<EmployeeId, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct GenerationResult {
    pub shifts: Vec<Shift>,
    pub warnings: Vec<String>,
    pub unfilled_slots: Vec<UnfilledSlot>,
    pub skipped_days: Vec<SkippedDay>,
    pub targets: Vec<HoursTarget>,
    pub stats: GenerationStats,
}

impl GenerationResult {
    pub fn is_complete(&self) -> bool {
        self.unfilled_slots.is_empty()
    }
}
