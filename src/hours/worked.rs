use crate::model::{EmployeeId, Shift, TimeOfDay};
use std::collections::BTreeMap;

const MINUTES_PER_DAY: i32 = TimeOfDay::MINUTES_PER_DAY as i32;

/// Durée d'un créneau en heures : `(fin - début) mod 24h - pause`, bornée à 0.
///
/// `start == end` compte pour 0h (pas 24h).
pub fn shift_duration_hours(start: TimeOfDay, end: TimeOfDay, break_minutes: u16) -> f64 {
    let span = (i32::from(end.minutes()) - i32::from(start.minutes())).rem_euclid(MINUTES_PER_DAY);
    let worked = (span - i32::from(break_minutes)).max(0);
    f64::from(worked) / 60.0
}

/// Somme des durées, chaque shift pris isolément (pas de fusion entre jours).
pub fn worked_hours<'a, I>(shifts: I) -> f64
where
    I: IntoIterator<Item = &'a Shift>,
{
    shifts
        .into_iter()
        .filter(|s| !s.is_deleted())
        .map(Shift::duration_hours)
        .sum()
}

pub fn hours_per_employee<'a, I>(shifts: I) -> BTreeMap<EmployeeId, f64>
where
    I: IntoIterator<Item = &'a Shift>,
{
    let mut out: BTreeMap<EmployeeId, f64> = BTreeMap::new();
    for shift in shifts.into_iter().filter(|s| !s.is_deleted()) {
        *out.entry(shift.employee_id.clone()).or_insert(0.0) += shift.duration_hours();
    }
    out
}
