use super::report::{self, ReportParts};
use super::types::{HoursTarget, SchedError, ShortfallCause, SkippedDay, UnfilledSlot};
use super::{AssignmentSet, GenerationResult, Scheduler};
use crate::calendar::{self, CalendarOracle};
use crate::config::{GenerationConfig, StaffingRequirement};
use crate::hours::{self, HoursPolicy};
use crate::model::{Employee, EmployeeId, EmployeePreferences, EmploymentType, Shift, ShiftTemplate};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// État d'une génération : tout est local à l'appel.
struct Run<'a> {
    config: &'a GenerationConfig,
    oracle: CalendarOracle<'a>,
    policy: &'a dyn HoursPolicy,
    employees: Vec<&'a Employee>,
    preferences: BTreeMap<&'a EmployeeId, &'a EmployeePreferences>,
    absent: BTreeMap<&'a EmployeeId, Vec<(NaiveDate, NaiveDate)>>,
    book: AssignmentSet,
    required: BTreeMap<(usize, i32, u32), f64>,
}

struct Candidate<'a> {
    order: usize,
    employee: &'a Employee,
    preference: u8,
    gap: f64,
}

pub(super) fn generate(
    scheduler: &Scheduler,
    config: &GenerationConfig,
) -> Result<GenerationResult, SchedError> {
    config.validate()?;
    let roster = scheduler.roster();
    let mut warnings = Vec::new();

    let templates = select_templates(roster.templates.as_slice(), config)?;
    let employees = select_employees(roster.employees.as_slice(), config, &mut warnings)?;

    let mut absent: BTreeMap<&EmployeeId, Vec<(NaiveDate, NaiveDate)>> = BTreeMap::new();
    for a in &roster.absences {
        absent.entry(&a.employee_id).or_default().push((a.start, a.end));
    }

    let mut run = Run {
        config,
        oracle: CalendarOracle::new(scheduler.holidays(), &config.sunday_policy),
        policy: scheduler.hours_policy_or(&config.hours),
        preferences: roster
            .preferences
            .iter()
            .map(|p| (&p.employee_id, p))
            .collect(),
        absent,
        book: AssignmentSet::from_shifts(roster.live_shifts()),
        required: BTreeMap::new(),
        employees,
    };

    for employee in &run.employees {
        if employee.employment == EmploymentType::Custom
            && employee.custom_hours.is_none()
            && employee.weekly_hours.is_none()
        {
            warnings.push(format!(
                "employee {} has a custom contract without hours; target is 0",
                employee.id
            ));
        }
    }

    let mut produced: Vec<Shift> = Vec::new();
    let mut unfilled: Vec<UnfilledSlot> = Vec::new();
    let mut skipped: Vec<SkippedDay> = Vec::new();

    for date in config
        .start_date
        .iter_days()
        .take_while(|d| *d <= config.end_date)
    {
        let kind = run.oracle.classify(date);
        if !kind.is_working() && !config.include_non_working_days {
            debug!(%date, %kind, "skipping non-working day");
            skipped.push(SkippedDay {
                date,
                reason: kind.to_string(),
            });
            continue;
        }

        for template in &templates {
            let Some(req) = requirement(config, date, template) else {
                continue;
            };
            if req.max == 0 {
                continue;
            }

            let (accepted, blocked) = run.fill_slot(date, template, req);
            let assigned = accepted.len() as u16;
            for employee in accepted {
                let shift = Shift::from_template(template, &employee.id, date);
                debug!(%date, template = %template.id, employee = %employee.id, "assigned");
                run.book.insert(&shift);
                produced.push(shift);
            }

            if assigned < req.min {
                let cause = blocked.unwrap_or(ShortfallCause::NoEligibleEmployees);
                warn!(%date, template = %template.id, assigned, required = req.min, %cause, "slot understaffed");
                warnings.push(format!(
                    "{date} {}: {assigned}/{} assigned ({cause})",
                    template.name, req.min
                ));
                unfilled.push(UnfilledSlot {
                    date,
                    template_id: template.id.clone(),
                    required: req.min,
                    assigned,
                    cause,
                    reason: cause.to_string(),
                });
            }
        }
    }

    let targets = run.targets();
    info!(
        shifts = produced.len(),
        unfilled = unfilled.len(),
        skipped = skipped.len(),
        "generation finished"
    );

    let existing: Vec<&Shift> = if config.include_existing_in_stats {
        roster.live_shifts().collect()
    } else {
        Vec::new()
    };

    Ok(report::assemble(ReportParts {
        shifts: produced,
        existing,
        warnings,
        unfilled_slots: unfilled,
        skipped_days: skipped,
        targets,
    }))
}

fn select_templates<'a>(
    templates: &'a [ShiftTemplate],
    config: &GenerationConfig,
) -> Result<Vec<&'a ShiftTemplate>, SchedError> {
    let selected: Vec<&ShiftTemplate> = if config.templates.is_empty() {
        templates.iter().collect()
    } else {
        config
            .templates
            .iter()
            .map(|id| {
                templates
                    .iter()
                    .find(|t| &t.id == id)
                    .ok_or_else(|| SchedError::UnknownTemplate(id.as_str().to_string()))
            })
            .collect::<Result<_, _>>()?
    };
    if selected.is_empty() {
        return Err(SchedError::NoTemplates);
    }
    if let Some(bad) = selected.iter().find(|t| t.start == t.end) {
        return Err(SchedError::InvalidTemplate(bad.id.as_str().to_string()));
    }
    Ok(selected)
}

fn select_employees<'a>(
    employees: &'a [Employee],
    config: &GenerationConfig,
    warnings: &mut Vec<String>,
) -> Result<Vec<&'a Employee>, SchedError> {
    let wanted: BTreeSet<&EmployeeId> = config.employees.iter().collect();
    for id in &wanted {
        match employees.iter().find(|e| &e.id == *id) {
            None => warnings.push(format!("selected employee {id} is not in the roster")),
            Some(e) if !e.active => warnings.push(format!("selected employee {id} is inactive")),
            Some(_) => {}
        }
    }
    let selected: Vec<&Employee> = employees
        .iter()
        .filter(|e| e.active && (wanted.is_empty() || wanted.contains(&e.id)))
        .collect();
    if selected.is_empty() {
        return Err(SchedError::NoEmployees);
    }
    Ok(selected)
}

/// Sans aucune règle d'effectif, la capacité du gabarit fait foi.
fn requirement(
    config: &GenerationConfig,
    date: NaiveDate,
    template: &ShiftTemplate,
) -> Option<StaffingRequirement> {
    if config.staffing.is_empty() {
        return Some(StaffingRequirement::new(template.capacity, template.capacity));
    }
    config.requirement(date.weekday(), &template.id)
}

impl<'a> Run<'a> {
    fn prefs(&self, id: &EmployeeId) -> Option<&'a EmployeePreferences> {
        self.preferences.get(id).copied()
    }

    fn is_absent(&self, id: &EmployeeId, date: NaiveDate) -> bool {
        self.absent
            .get(id)
            .is_some_and(|ranges| ranges.iter().any(|(s, e)| *s <= date && date <= *e))
    }

    fn required_for(&mut self, order: usize, year: i32, month: u32) -> f64 {
        if let Some(hours) = self.required.get(&(order, year, month)) {
            return *hours;
        }
        let hours = hours::required_hours_for(self.employees[order], year, month, &self.oracle, self.policy);
        self.required.insert((order, year, month), hours);
        hours
    }

    /// Sélectionne les salariés d'un créneau, renvoie aussi la première
    /// cause d'exclusion rencontrée.
    fn fill_slot(
        &mut self,
        date: NaiveDate,
        template: &ShiftTemplate,
        req: StaffingRequirement,
    ) -> (Vec<&'a Employee>, Option<ShortfallCause>) {
        let weekday = date.weekday();
        let ranking_by_preference = self.config.respect_preferences || self.config.fill_preferred_first;
        let mut blocked: Option<ShortfallCause> = None;

        let mut pool: Vec<Candidate<'a>> = Vec::new();
        for order in 0..self.employees.len() {
            let employee = self.employees[order];
            let prefs = self.prefs(&employee.id);
            if self.is_absent(&employee.id, date)
                || prefs.is_some_and(|p| p.is_unavailable_on(weekday))
            {
                blocked.get_or_insert(ShortfallCause::Unavailable);
                continue;
            }
            if self.book.has_shift_on(&employee.id, date) {
                blocked.get_or_insert(ShortfallCause::AlreadyWorking);
                continue;
            }
            let preference = match prefs {
                Some(p) if ranking_by_preference => p.match_score(weekday, template),
                _ => 0,
            };
            let gap = if self.config.distribute_hours_evenly {
                let required = self.required_for(order, date.year(), date.month());
                required - self.book.hours_in_month(&employee.id, date.year(), date.month())
            } else {
                0.0
            };
            pool.push(Candidate {
                order,
                employee,
                preference,
                gap,
            });
        }

        // tri stable : à égalité, l'ordre du roster départage
        pool.sort_by(|a, b| {
            b.preference
                .cmp(&a.preference)
                .then_with(|| b.gap.total_cmp(&a.gap))
                .then(a.order.cmp(&b.order))
        });

        let mut accepted = Vec::new();
        for candidate in pool {
            if accepted.len() >= usize::from(req.max) {
                break;
            }
            match self.check(candidate.employee, date, template) {
                Ok(()) => accepted.push(candidate.employee),
                Err(cause) => {
                    debug!(%date, template = %template.id, employee = %candidate.employee.id, %cause, "candidate rejected");
                    blocked.get_or_insert(cause);
                }
            }
        }
        (accepted, blocked)
    }

    /// Contraintes dures d'un candidat pour un créneau.
    fn check(
        &self,
        employee: &Employee,
        date: NaiveDate,
        template: &ShiftTemplate,
    ) -> Result<(), ShortfallCause> {
        let id = &employee.id;
        let config = self.config;
        let personal = self.prefs(id).filter(|_| config.respect_preferences);

        if self.book.has_time_conflict(id, date, template.start, template.end) {
            return Err(ShortfallCause::TimeConflict);
        }
        if self.book.is_already_assigned(id, date, template) {
            return Err(ShortfallCause::DuplicateSlot);
        }

        let min_rest = personal
            .and_then(|p| p.min_rest_hours)
            .map_or(config.min_rest_between_shifts, |h| h.max(config.min_rest_between_shifts));
        if !self.book.rest_satisfied(id, date, template.start, min_rest)
            || !self
                .book
                .next_rest_satisfied(id, date, template.start, template.end, min_rest)
        {
            return Err(ShortfallCause::RestPeriod);
        }

        let max_days = tighter_limit(
            config.max_consecutive_work_days,
            personal.and_then(|p| p.max_consecutive_days),
        );
        if !self.book.consecutive_days_ok(id, date, max_days) {
            return Err(ShortfallCause::ConsecutiveDays);
        }

        if config.avoid_consecutive_weekends
            && calendar::is_weekend(date)
            && self.book.worked_previous_weekend(id, date)
            && self.book.weekends_worked_in_month(id, date) >= config.max_weekends_per_month
        {
            return Err(ShortfallCause::WeekendSpacing);
        }

        if let Some(max_week) = personal.and_then(|p| p.max_hours_per_week) {
            let planned = self.book.hours_in_week(id, date) + template.duration_hours();
            if planned.total_cmp(&max_week) == Ordering::Greater {
                return Err(ShortfallCause::WeeklyHours);
            }
        }

        Ok(())
    }

    /// Objectif vs planifié pour chaque salarié et chaque mois de la période.
    fn targets(&mut self) -> Vec<HoursTarget> {
        let mut months: Vec<(i32, u32)> = Vec::new();
        for date in self
            .config
            .start_date
            .iter_days()
            .take_while(|d| *d <= self.config.end_date)
        {
            let key = (date.year(), date.month());
            if months.last() != Some(&key) {
                months.push(key);
            }
        }

        let mut out = Vec::new();
        for order in 0..self.employees.len() {
            for &(year, month) in &months {
                let required = self.required_for(order, year, month);
                let employee_id = self.employees[order].id.clone();
                let scheduled = self.book.hours_in_month(&employee_id, year, month);
                out.push(HoursTarget {
                    employee_id,
                    year,
                    month,
                    required,
                    scheduled,
                });
            }
        }
        out
    }
}

/// Plus petite limite non nulle ; 0 = illimité.
fn tighter_limit(global: u32, personal: Option<u32>) -> u32 {
    match personal.filter(|p| *p > 0) {
        Some(p) if global == 0 => p,
        Some(p) => p.min(global),
        None => global,
    }
}
