use super::{util, AssignOptions, Conflict, ConflictKind, Scheduler};
use crate::model::Shift;

/// Audit complet du roster : chevauchements, doublons, repos, séries.
pub(super) fn detect_conflicts(scheduler: &Scheduler, opts: AssignOptions) -> Vec<Conflict> {
    let roster = scheduler.roster();
    let min_rest = (opts.min_rest_hours.max(0.0) * 60.0).round() as i64;
    let mut out = Vec::new();

    for employee in roster.employees.iter() {
        let mut shifts: Vec<&Shift> = roster
            .live_shifts()
            .filter(|s| s.employee_id == employee.id)
            .collect();
        shifts.sort_by_key(|s| (s.date, s.start));

        let conflict = |a: &Shift, b: &Shift, kind| Conflict {
            employee: employee.id.clone(),
            shift_a: a.id.clone(),
            shift_b: b.id.clone(),
            kind,
        };

        for (idx, &a) in shifts.iter().enumerate() {
            for &b in shifts.iter().skip(idx + 1) {
                let days = (b.date - a.date).num_days();
                if days > 1 {
                    break;
                }
                if days == 0 {
                    if a.start == b.start && a.end == b.end {
                        out.push(conflict(a, b, ConflictKind::DoubleAssignment));
                    } else if util::overlaps(util::span(a.start, a.end), util::span(b.start, b.end)) {
                        out.push(conflict(a, b, ConflictKind::Overlap));
                    }
                    continue;
                }
                let rest = util::rest_minutes(util::span(a.start, a.end), b.start, days);
                if rest < min_rest {
                    out.push(conflict(a, b, ConflictKind::RestViolation));
                }
            }
        }

        if opts.max_consecutive_days == 0 {
            continue;
        }
        // une entrée par série trop longue : premier shift, shift en excès
        let mut run_start = 0usize;
        let mut run_days = 0u32;
        for idx in 0..shifts.len() {
            let shift = shifts[idx];
            match idx.checked_sub(1).map(|p| (shift.date - shifts[p].date).num_days()) {
                Some(0) => continue,
                Some(1) => run_days += 1,
                _ => {
                    run_start = idx;
                    run_days = 1;
                }
            }
            if run_days == opts.max_consecutive_days + 1 {
                out.push(conflict(shifts[run_start], shift, ConflictKind::ConsecutiveDays));
            }
        }
    }

    out
}
