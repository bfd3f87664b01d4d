use crate::model::{Absence, Employee, EmployeeId, Roster, Shift, ShiftTemplate, TimeOfDay};
use crate::scheduler::GenerationResult;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de salariés: header `id,name[,employment][,custom_hours][,weekly_hours][,active]`
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = required(&rec, 0, "id")?;
        let name = required(&rec, 1, "name")?;
        let mut employee = Employee::new(id, name);
        if let Some(kind) = optional(&rec, 2) {
            employee.employment = kind
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid employment for {id}"))?;
        }
        if let Some(hours) = optional(&rec, 3) {
            employee.custom_hours = Some(
                hours
                    .parse()
                    .with_context(|| format!("invalid custom_hours for {id}"))?,
            );
        }
        if let Some(hours) = optional(&rec, 4) {
            employee.weekly_hours = Some(
                hours
                    .parse()
                    .with_context(|| format!("invalid weekly_hours for {id}"))?,
            );
        }
        if let Some(flag) = optional(&rec, 5) {
            employee.active =
                parse_bool(flag).with_context(|| format!("invalid active value for {id}"))?;
        }
        out.push(employee);
    }
    Ok(out)
}

/// Import de gabarits: header `id,name,start,end[,break_minutes][,capacity][,default]`
pub fn import_templates_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftTemplate>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = required(&rec, 0, "id")?;
        let name = required(&rec, 1, "name")?;
        let start: TimeOfDay = required(&rec, 2, "start")?.parse()?;
        let end: TimeOfDay = required(&rec, 3, "end")?.parse()?;
        if start == end {
            bail!("template {id}: start and end must differ");
        }
        let break_minutes = optional(&rec, 4)
            .map(str::parse::<u16>)
            .transpose()
            .with_context(|| format!("invalid break_minutes for {id}"))?
            .unwrap_or(0);
        let mut template = ShiftTemplate::new(id, name, start, end, break_minutes);
        if let Some(capacity) = optional(&rec, 5) {
            template.capacity = capacity
                .parse()
                .with_context(|| format!("invalid capacity for {id}"))?;
        }
        if let Some(flag) = optional(&rec, 6) {
            template.is_default = parse_bool(flag)?;
        }
        out.push(template);
    }
    Ok(out)
}

/// Import d'absences: header `employee_id,start[,end]` (dates ISO, bornes incluses)
pub fn import_absences_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Absence>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let employee = required(&rec, 0, "employee_id")?;
        let start = parse_date(required(&rec, 1, "start")?)?;
        let end = match optional(&rec, 2) {
            Some(raw) => parse_date(raw)?,
            None => start,
        };
        let absence =
            Absence::new(EmployeeId::new(employee), start, end).map_err(anyhow::Error::msg)?;
        out.push(absence);
    }
    Ok(out)
}

fn required<'r>(rec: &'r StringRecord, idx: usize, field: &str) -> anyhow::Result<&'r str> {
    let value = rec
        .get(idx)
        .with_context(|| format!("missing {field}"))?
        .trim();
    if value.is_empty() {
        bail!("empty {field}");
    }
    Ok(value)
}

fn optional(rec: &StringRecord, idx: usize) -> Option<&str> {
    rec.get(idx).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Export JSON du roster (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export JSON d'un résultat de génération
pub fn export_result_json<P: AsRef<Path>>(path: P, result: &GenerationResult) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(result)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des shifts: header `id,employee_id,employee_name,date,start,end,break_minutes,hours,status`
pub fn export_shifts_csv<P: AsRef<Path>>(
    path: P,
    roster: &Roster,
    shifts: &[Shift],
) -> anyhow::Result<()> {
    let file = fs::File::create(path)?;
    write_shifts_csv(file, roster, shifts)
}

pub fn write_shifts_csv<W: std::io::Write>(
    out: W,
    roster: &Roster,
    shifts: &[Shift],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record([
        "id",
        "employee_id",
        "employee_name",
        "date",
        "start",
        "end",
        "break_minutes",
        "hours",
        "status",
    ])?;
    for s in shifts {
        let name = roster
            .find_employee(&s.employee_id)
            .map(|e| e.name.as_str())
            .unwrap_or("");
        let status = serde_json::to_value(s.status)?;
        let date = s.date.to_string();
        let start = s.start.to_string();
        let end = s.end.to_string();
        let break_minutes = s.break_minutes.to_string();
        let hours = format!("{:.2}", s.duration_hours());
        w.write_record([
            s.id.as_str(),
            s.employee_id.as_str(),
            name,
            date.as_str(),
            start.as_str(),
            end.as_str(),
            break_minutes.as_str(),
            hours.as_str(),
            status.as_str().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}
