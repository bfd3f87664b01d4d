use crate::model::TimeOfDay;

pub(crate) const MINUTES_PER_DAY: i32 = TimeOfDay::MINUTES_PER_DAY as i32;

/// Intervalle [start, end) en minutes depuis minuit du jour du shift ;
/// un shift de nuit déborde au-delà de 1440.
pub(crate) fn span(start: TimeOfDay, end: TimeOfDay) -> (i32, i32) {
    let s = i32::from(start.minutes());
    let mut e = i32::from(end.minutes());
    if e <= s {
        e += MINUTES_PER_DAY;
    }
    (s, e)
}

pub(crate) fn overlaps(a: (i32, i32), b: (i32, i32)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Repos en minutes entre la fin d'un shift et le début d'un shift
/// commençant `days_later` jours plus tard. Négatif si chevauchement.
pub(crate) fn rest_minutes(earlier: (i32, i32), later_start: TimeOfDay, days_later: i64) -> i64 {
    i64::from(later_start.minutes()) + days_later * i64::from(MINUTES_PER_DAY) - i64::from(earlier.1)
}
