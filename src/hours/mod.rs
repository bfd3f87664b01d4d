//! Comptabilité horaire : objectif contractuel et heures planifiées.

mod required;
mod worked;

pub use required::{eligible_days, required_hours, required_hours_for, HoursPolicy, StandardHours};
pub use worked::{hours_per_employee, shift_duration_hours, worked_hours};
