use super::types::{GenerationResult, GenerationStats, HoursTarget, SkippedDay, UnfilledSlot};
use crate::hours;
use crate::model::Shift;

/// Éléments bruts d'un résultat, avant agrégation.
pub(super) struct ReportParts<'a> {
    pub shifts: Vec<Shift>,
    /// Shifts préexistants à intégrer aux totaux d'heures.
    pub existing: Vec<&'a Shift>,
    pub warnings: Vec<String>,
    pub unfilled_slots: Vec<UnfilledSlot>,
    pub skipped_days: Vec<SkippedDay>,
    pub targets: Vec<HoursTarget>,
}

/// Agrégation pure : aucune décision n'est prise ici.
pub(super) fn assemble(parts: ReportParts<'_>) -> GenerationResult {
    let hours_per_employee =
        hours::hours_per_employee(parts.shifts.iter().chain(parts.existing.iter().copied()));
    let stats = GenerationStats {
        total_shifts: parts.shifts.len(),
        hours_per_employee,
    };
    GenerationResult {
        shifts: parts.shifts,
        warnings: parts.warnings,
        unfilled_slots: parts.unfilled_slots,
        skipped_days: parts.skipped_days,
        targets: parts.targets,
        stats,
    }
}
