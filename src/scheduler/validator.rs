//! Prédicats de contraintes dures, partagés par le générateur et par
//! l'ajout interactif. Aucun ne modifie l'ensemble consulté.

use super::util;
use crate::calendar;
use crate::model::{EmployeeId, Shift, ShiftTemplate, TemplateId, TimeOfDay};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct Booked {
    start: TimeOfDay,
    end: TimeOfDay,
    hours: f64,
    template: Option<TemplateId>,
}

impl Booked {
    fn span(&self) -> (i32, i32) {
        util::span(self.start, self.end)
    }
}

/// Affectations courantes, indexées par salarié puis par date.
#[derive(Debug, Clone, Default)]
pub struct AssignmentSet {
    by_employee: BTreeMap<EmployeeId, BTreeMap<NaiveDate, Vec<Booked>>>,
}

impl AssignmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Les shifts `deleted` sont ignorés.
    pub fn from_shifts<'a, I>(shifts: I) -> Self
    where
        I: IntoIterator<Item = &'a Shift>,
    {
        let mut set = Self::new();
        for shift in shifts {
            set.insert(shift);
        }
        set
    }

    pub fn insert(&mut self, shift: &Shift) {
        if shift.is_deleted() {
            return;
        }
        self.by_employee
            .entry(shift.employee_id.clone())
            .or_default()
            .entry(shift.date)
            .or_default()
            .push(Booked {
                start: shift.start,
                end: shift.end,
                hours: shift.duration_hours(),
                template: shift.template_id.clone(),
            });
    }

    fn day(&self, employee: &EmployeeId, date: NaiveDate) -> &[Booked] {
        self.by_employee
            .get(employee)
            .and_then(|days| days.get(&date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_shift_on(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        !self.day(employee, date).is_empty()
    }

    /// Chevauchement avec un shift du même jour (intervalles ramenés au
    /// jour du shift, la nuit débordant sur le lendemain).
    pub fn has_time_conflict(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> bool {
        let proposed = util::span(start, end);
        self.day(employee, date)
            .iter()
            .any(|b| util::overlaps(b.span(), proposed))
    }

    /// Même date, mêmes heures que le gabarit.
    pub fn is_already_assigned(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
        template: &ShiftTemplate,
    ) -> bool {
        self.holds_slot(employee, date, template.start, template.end, Some(&template.id))
    }

    /// Créneau identique déjà tenu : mêmes heures, ou même gabarit.
    pub fn holds_slot(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
        template: Option<&TemplateId>,
    ) -> bool {
        self.day(employee, date).iter().any(|b| {
            (b.start == start && b.end == end)
                || (template.is_some() && b.template.as_ref() == template)
        })
    }

    /// Repos depuis le dernier shift de la veille ; `true` sans shift la
    /// veille. Un chevauchement réel (repos négatif) échoue toujours.
    pub fn rest_satisfied(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
        start: TimeOfDay,
        min_rest_hours: f64,
    ) -> bool {
        let Some(prev) = date.pred_opt() else {
            return true;
        };
        let min_rest = (min_rest_hours.max(0.0) * 60.0).round() as i64;
        self.day(employee, prev)
            .iter()
            .map(|b| util::rest_minutes(b.span(), start, 1))
            .min()
            .map_or(true, |rest| rest >= min_rest)
    }

    /// Repos entre la fin du shift proposé et le premier shift du lendemain.
    pub fn next_rest_satisfied(
        &self,
        employee: &EmployeeId,
        date: NaiveDate,
        start: TimeOfDay,
        end: TimeOfDay,
        min_rest_hours: f64,
    ) -> bool {
        let Some(next) = date.succ_opt() else {
            return true;
        };
        let proposed = util::span(start, end);
        let min_rest = (min_rest_hours.max(0.0) * 60.0).round() as i64;
        self.day(employee, next)
            .iter()
            .map(|b| util::rest_minutes(proposed, b.start, 1))
            .min()
            .map_or(true, |rest| rest >= min_rest)
    }

    /// Longueur de la série de jours travaillés contenant `date`, en
    /// comptant `date` comme travaillé.
    pub fn streak_through(&self, employee: &EmployeeId, date: NaiveDate) -> u32 {
        let Some(days) = self.by_employee.get(employee) else {
            return 1;
        };
        let worked = |d: NaiveDate| days.get(&d).is_some_and(|v| !v.is_empty());

        let mut streak = 1u32;
        let mut cursor = date;
        while let Some(prev) = cursor.pred_opt().filter(|d| worked(*d)) {
            streak += 1;
            cursor = prev;
        }
        cursor = date;
        while let Some(next) = cursor.succ_opt().filter(|d| worked(*d)) {
            streak += 1;
            cursor = next;
        }
        streak
    }

    /// `max_days == 0` désactive la limite.
    pub fn consecutive_days_ok(&self, employee: &EmployeeId, date: NaiveDate, max_days: u32) -> bool {
        max_days == 0 || self.streak_through(employee, date) <= max_days
    }

    /// A travaillé le samedi ou le dimanche du week-end précédent.
    pub fn worked_previous_weekend(&self, employee: &EmployeeId, date: NaiveDate) -> bool {
        let Some(saturday) = calendar::weekend_start(date) else {
            return false;
        };
        let prev_sat = saturday - Duration::days(7);
        let prev_sun = saturday - Duration::days(6);
        self.has_shift_on(employee, prev_sat) || self.has_shift_on(employee, prev_sun)
    }

    /// Week-ends (hors celui de `date`) travaillés dans le mois de `date`.
    pub fn weekends_worked_in_month(&self, employee: &EmployeeId, date: NaiveDate) -> u32 {
        let current = calendar::weekend_start(date);
        let Some(days) = self.by_employee.get(employee) else {
            return 0;
        };
        let keys: BTreeSet<NaiveDate> = days
            .iter()
            .filter(|(d, booked)| {
                !booked.is_empty() && d.year() == date.year() && d.month() == date.month()
            })
            .filter_map(|(d, _)| calendar::weekend_start(*d))
            .filter(|key| Some(*key) != current)
            .collect();
        keys.len() as u32
    }

    /// Heures planifiées sur la semaine ISO de `date`.
    pub fn hours_in_week(&self, employee: &EmployeeId, date: NaiveDate) -> f64 {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let sunday = monday + Duration::days(6);
        self.hours_between(employee, monday, sunday)
    }

    pub fn hours_in_month(&self, employee: &EmployeeId, year: i32, month: u32) -> f64 {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return 0.0;
        };
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(first);
        self.hours_between(employee, first, last)
    }

    fn hours_between(&self, employee: &EmployeeId, from: NaiveDate, to: NaiveDate) -> f64 {
        self.by_employee
            .get(employee)
            .map(|days| {
                days.range(from..=to)
                    .flat_map(|(_, booked)| booked.iter())
                    .map(|b| b.hours)
                    .sum()
            })
            .unwrap_or(0.0)
    }
}
