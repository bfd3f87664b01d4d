use super::{AssignOptions, AssignmentSet, ConflictKind, SchedError, Scheduler};
use crate::model::{EmployeeId, Shift, ShiftId, ShiftStatus, ShiftTemplate, TemplateId, TimeOfDay};
use chrono::NaiveDate;
use tracing::debug;

/// Demande d'affectation manuelle d'un salarié.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRequest {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub break_minutes: u16,
    pub template_id: Option<TemplateId>,
    pub notes: Option<String>,
}

impl ShiftRequest {
    pub fn from_template(template: &ShiftTemplate, employee_id: EmployeeId, date: NaiveDate) -> Self {
        Self {
            employee_id,
            date,
            start: template.start,
            end: template.end,
            break_minutes: template.break_minutes,
            template_id: Some(template.id.clone()),
            notes: None,
        }
    }
}

/// Vérifie la demande contre le roster courant ; rien n'est modifié, la
/// première violation est renvoyée telle quelle.
pub(super) fn propose(
    scheduler: &Scheduler,
    request: &ShiftRequest,
    opts: AssignOptions,
) -> Result<Shift, SchedError> {
    let roster = scheduler.roster();
    let id = &request.employee_id;
    let employee = roster
        .find_employee(id)
        .ok_or_else(|| SchedError::UnknownEmployee(id.as_str().to_string()))?;
    if !employee.active {
        return Err(SchedError::Conflict(ConflictKind::Inactive));
    }
    if roster.is_absent(id, request.date) {
        return Err(SchedError::Conflict(ConflictKind::Absent));
    }
    if let Some(template_id) = &request.template_id {
        if roster.find_template(template_id).is_none() {
            return Err(SchedError::UnknownTemplate(template_id.as_str().to_string()));
        }
    }

    let book = AssignmentSet::from_shifts(roster.live_shifts());
    let rejected = if book.holds_slot(
        id,
        request.date,
        request.start,
        request.end,
        request.template_id.as_ref(),
    ) {
        Some(ConflictKind::DoubleAssignment)
    } else if book.has_time_conflict(id, request.date, request.start, request.end) {
        Some(ConflictKind::Overlap)
    } else if !book.rest_satisfied(id, request.date, request.start, opts.min_rest_hours)
        || !book.next_rest_satisfied(
            id,
            request.date,
            request.start,
            request.end,
            opts.min_rest_hours,
        )
    {
        Some(ConflictKind::RestViolation)
    } else if !book.consecutive_days_ok(id, request.date, opts.max_consecutive_days) {
        Some(ConflictKind::ConsecutiveDays)
    } else {
        None
    };

    if let Some(kind) = rejected {
        debug!(employee = %id, date = %request.date, %kind, "manual assignment rejected");
        return Err(SchedError::Conflict(kind));
    }

    Ok(Shift {
        id: ShiftId::random(),
        employee_id: id.clone(),
        date: request.date,
        start: request.start,
        end: request.end,
        break_minutes: request.break_minutes,
        template_id: request.template_id.clone(),
        notes: request.notes.clone(),
        color: None,
        status: ShiftStatus::New,
    })
}
