#![forbid(unsafe_code)]
//! Roulement — moteur de génération automatique de plannings d'équipe.
//!
//! - Calcul pur : aucune E/S dans le moteur, aucun état partagé entre appels.
//! - Jours fériés polonais et dimanches commerciaux (politique all/none/custom).
//! - Heures en minutes depuis minuit ; chaînes `HH:MM:SS` aux frontières.
//! - Allocation gloutonne déterministe : même entrée, même sortie.
//! - Éditions locales (`Changeset`) commitées vers un `Storage` fichier.

pub mod calendar;
pub mod changeset;
pub mod config;
pub mod hours;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use calendar::{
    is_non_trading_sunday, is_trading_sunday, CalendarOracle, DayKind, HolidayCalendar,
    NoHolidays, PolishHolidays, SundayPolicy,
};
pub use changeset::{ChangeConflict, ChangeConflictKind, ChangePlan, Changeset, ChangesetError};
pub use config::{load_config_from_file, GenerationConfig, StaffingRequirement, StaffingRule};
pub use hours::{required_hours, shift_duration_hours, worked_hours, HoursPolicy, StandardHours};
pub use model::{
    Absence, Employee, EmployeeId, EmployeePreferences, EmploymentType, Roster, Shift, ShiftId,
    ShiftStatus, ShiftTemplate, ShiftTimePreference, TemplateId, TimeOfDay,
};
pub use scheduler::{
    generate, AssignOptions, AssignmentSet, Conflict, ConflictKind, GenerationResult, SchedError,
    Scheduler, ShiftRequest, ShortfallCause, UnfilledSlot,
};
pub use storage::{JsonStorage, MemoryStorage, Storage};
