#![forbid(unsafe_code)]
use chrono::{NaiveDate, Weekday};
use roulement::{
    config::{export_config_json, load_config_from_file, GenerationConfig, StaffingRequirement},
    io,
    model::{Employee, EmploymentType, Roster, Shift, ShiftId, ShiftStatus, TemplateId},
    SchedError, SundayPolicy,
};
use std::fs;
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn import_employees_with_optional_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("employees.csv");
    fs::write(
        &path,
        "id,name,employment,custom_hours,weekly_hours,active\n\
         alice,Alice,full,,,\n\
         bob,Bob,half,,,no\n\
         carol,Carol,custom,120,,\n",
    )
    .unwrap();

    let employees = io::import_employees_csv(&path).unwrap();
    assert_eq!(employees.len(), 3);
    assert_eq!(employees[0].employment, EmploymentType::Full);
    assert!(employees[0].active);
    assert_eq!(employees[1].employment, EmploymentType::Half);
    assert!(!employees[1].active);
    assert_eq!(employees[2].custom_hours, Some(120.0));

    fs::write(
        &path,
        "id,name,employment,custom_hours,weekly_hours,active\nalice,Alice\nbob,Bob,half\n",
    )
    .unwrap();
    let employees = io::import_employees_csv(&path).unwrap();
    assert_eq!(employees[0].employment, EmploymentType::Full);
    assert!(employees[0].active);
    assert_eq!(employees[1].employment, EmploymentType::Half);

    fs::write(&path, "id,name,employment\ndave,Dave,weekend\n").unwrap();
    let err = io::import_employees_csv(&path).unwrap_err();
    assert!(format!("{err:#}").contains("invalid employment for dave"));
}

#[test]
fn import_templates_and_absences() {
    let dir = tempdir().unwrap();
    let templates = dir.path().join("templates.csv");
    fs::write(
        &templates,
        "id,name,start,end,break_minutes,capacity,default\n\
         day,Day,08:00,16:00,30,2,true\n\
         night,Night,22:00:00,06:00:00,,,\n",
    )
    .unwrap();
    let parsed = io::import_templates_csv(&templates).unwrap();
    assert_eq!(parsed[0].capacity, 2);
    assert!(parsed[0].is_default);
    assert_eq!(parsed[0].duration_hours(), 7.5);
    assert_eq!(parsed[1].break_minutes, 0);
    assert_eq!(parsed[1].capacity, 1);
    assert!(parsed[1].is_overnight());

    fs::write(
        &templates,
        "id,name,start,end,break_minutes,capacity,default\nday,Day,08:00,16:00\n",
    )
    .unwrap();
    let short = io::import_templates_csv(&templates).unwrap();
    assert_eq!(short[0].break_minutes, 0);
    assert_eq!(short[0].capacity, 1);
    assert!(!short[0].is_default);

    fs::write(&templates, "id,name,start,end\nzero,Zero,09:00,09:00\n").unwrap();
    assert!(io::import_templates_csv(&templates).is_err());

    let absences = dir.path().join("absences.csv");
    fs::write(
        &absences,
        "employee_id,start,end\nalice,2025-03-03,2025-03-05\nbob,2025-03-10\n",
    )
    .unwrap();
    let parsed = io::import_absences_csv(&absences).unwrap();
    assert_eq!(parsed[0].end, d(2025, 3, 5));
    assert_eq!(parsed[1].start, parsed[1].end);

    fs::write(&absences, "employee_id,start,end\nalice,2025-03-05,2025-03-03\n").unwrap();
    assert!(io::import_absences_csv(&absences).is_err());
}

#[test]
fn shifts_csv_export() {
    let roster = Roster {
        employees: vec![Employee::new("alice", "Alice")],
        ..Roster::default()
    };
    let day = Shift {
        id: ShiftId::new("s1"),
        employee_id: roulement::EmployeeId::new("alice"),
        date: d(2025, 3, 3),
        start: "08:00".parse().unwrap(),
        end: "16:00".parse().unwrap(),
        break_minutes: 30,
        template_id: Some(TemplateId::new("day")),
        notes: None,
        color: None,
        status: ShiftStatus::Unchanged,
    };
    let night = Shift {
        id: ShiftId::new("s2"),
        employee_id: roulement::EmployeeId::new("ghost"),
        date: d(2025, 3, 4),
        start: "22:00".parse().unwrap(),
        end: "06:00".parse().unwrap(),
        break_minutes: 0,
        template_id: None,
        notes: Some("renfort".into()),
        color: None,
        status: ShiftStatus::New,
    };

    let mut buf: Vec<u8> = Vec::new();
    io::write_shifts_csv(&mut buf, &roster, &[day, night]).unwrap();
    let out = String::from_utf8(buf).unwrap();
    insta::assert_snapshot!(out.trim_end(), @r"
    id,employee_id,employee_name,date,start,end,break_minutes,hours,status
    s1,alice,Alice,2025-03-03,08:00:00,16:00:00,30,7.50,unchanged
    s2,ghost,,2025-03-04,22:00:00,06:00:00,0,8.00,new
    ");
}

#[test]
fn config_defaults_and_rules() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "start_date": "2025-03-03",
            "end_date": "2025-03-09",
            "staffing": [
                {"weekday": "Mon", "min": 1, "max": 2},
                {"weekday": "Mon", "min": 2, "max": 2, "template": "late"}
            ],
            "sunday_policy": {"mode": "none"}
        }"#,
    )
    .unwrap();

    let config = load_config_from_file(&path).unwrap();
    assert_eq!(config.min_rest_between_shifts, 11.0);
    assert_eq!(config.max_consecutive_work_days, 0);
    assert_eq!(config.max_weekends_per_month, 2);
    assert_eq!(config.hours.full_daily_hours, 8.0);
    assert_eq!(config.sunday_policy, SundayPolicy::Never);
    assert!(!config.distribute_hours_evenly);

    assert_eq!(
        config.requirement(Weekday::Mon, &TemplateId::new("late")),
        Some(StaffingRequirement::new(2, 2))
    );
    assert_eq!(
        config.requirement(Weekday::Mon, &TemplateId::new("day")),
        Some(StaffingRequirement::new(1, 2))
    );
    assert_eq!(config.requirement(Weekday::Tue, &TemplateId::new("day")), None);

    let copy = dir.path().join("copy.json");
    export_config_json(&copy, &config).unwrap();
    assert_eq!(load_config_from_file(&copy).unwrap(), config);
}

#[test]
fn invalid_config_is_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"start_date":"2025-03-03","end_date":"2025-03-09",
            "staffing":[{"weekday":"Fri","min":3,"max":1}]}"#,
    )
    .unwrap();
    let err = load_config_from_file(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchedError>(),
        Some(SchedError::InvalidStaffing { weekday: Weekday::Fri, .. })
    ));

    let mut config = GenerationConfig::new(d(2025, 3, 3), d(2025, 3, 9));
    config.min_rest_between_shifts = -1.0;
    assert!(matches!(config.validate(), Err(SchedError::InvalidSetting(_))));

    assert!(load_config_from_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn result_json_uses_wall_clock_strings() {
    let dir = tempdir().unwrap();
    let mut scheduler = roulement::Scheduler::new();
    scheduler.add_employees(vec![Employee::new("alice", "Alice")]);
    scheduler.add_templates(vec![roulement::ShiftTemplate::new(
        "day",
        "Day",
        "08:00".parse().unwrap(),
        "16:00".parse().unwrap(),
        30,
    )]);
    let config = GenerationConfig::new(d(2025, 3, 3), d(2025, 3, 3));
    let result = scheduler.generate(&config).unwrap();

    let path = dir.path().join("result.json");
    io::export_result_json(&path, &result).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(value["shifts"][0]["start"], "08:00:00");
    assert_eq!(value["shifts"][0]["status"], "new");
    assert_eq!(value["stats"]["total_shifts"], 1);
}
