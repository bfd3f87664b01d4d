#![forbid(unsafe_code)]
use chrono::{Datelike, NaiveDate};
use roulement::{
    calendar::{easter_sunday, holidays_in_year, weekend_start},
    hours::{eligible_days, required_hours_for},
    is_non_trading_sunday, is_trading_sunday, shift_duration_hours, worked_hours, CalendarOracle,
    DayKind, Employee, EmployeeId, EmploymentType, HolidayCalendar, NoHolidays, PolishHolidays,
    Shift, ShiftStatus, ShiftTemplate, StandardHours, SundayPolicy, TimeOfDay,
};
use std::collections::BTreeSet;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

#[test]
fn time_of_day_parsing() {
    assert_eq!(t("08:00").minutes(), 480);
    assert_eq!(t("08:00:00"), t("08:00"));
    assert_eq!(t("23:59").to_string(), "23:59:00");
    assert!("24:00".parse::<TimeOfDay>().is_err());
    assert!("8h".parse::<TimeOfDay>().is_err());
    assert_eq!(TimeOfDay::from_hm(6, 30), Some(t("06:30")));
    assert_eq!(TimeOfDay::from_hm(6, 60), None);
}

#[test]
fn shift_durations() {
    assert_eq!(shift_duration_hours(t("08:00"), t("16:00"), 30), 7.5);
    assert_eq!(shift_duration_hours(t("22:00"), t("06:00"), 0), 8.0);
    assert_eq!(shift_duration_hours(t("08:00"), t("09:00"), 90), 0.0);
    assert_eq!(shift_duration_hours(t("10:00"), t("10:00"), 0), 0.0);

    let night = ShiftTemplate::new("night", "Night", t("22:00"), t("06:00"), 30);
    assert!(night.is_overnight());
    assert_eq!(night.duration_hours(), 7.5);
}

#[test]
fn worked_hours_skip_deleted_shifts() {
    let tpl = ShiftTemplate::new("day", "Day", t("08:00"), t("16:00"), 30);
    let alice = EmployeeId::new("alice");
    let mut shifts: Vec<Shift> = (3..=5)
        .map(|day| Shift::from_template(&tpl, &alice, d(2025, 3, day)))
        .collect();
    assert_eq!(worked_hours(&shifts), 22.5);
    shifts[1].status = ShiftStatus::Deleted;
    assert_eq!(worked_hours(&shifts), 15.0);
}

#[test]
fn easter_dates() {
    assert_eq!(easter_sunday(2024), Some(d(2024, 3, 31)));
    assert_eq!(easter_sunday(2025), Some(d(2025, 4, 20)));
    assert_eq!(easter_sunday(2026), Some(d(2026, 4, 5)));
}

#[test]
fn polish_holidays_2025() {
    let listing = holidays_in_year(&PolishHolidays, 2025)
        .into_iter()
        .map(|(date, name)| format!("{date} {name}"))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(listing, @r"
    2025-01-01 Nowy Rok
    2025-01-06 Święto Trzech Króli
    2025-04-20 Wielkanoc
    2025-04-21 Poniedziałek Wielkanocny
    2025-05-01 Święto Pracy
    2025-05-03 Święto Konstytucji 3 Maja
    2025-06-08 Zielone Świątki
    2025-06-19 Boże Ciało
    2025-08-15 Wniebowzięcie Najświętszej Maryi Panny
    2025-11-01 Wszystkich Świętych
    2025-11-11 Narodowe Święto Niepodległości
    2025-12-24 Wigilia Bożego Narodzenia
    2025-12-25 Boże Narodzenie
    2025-12-26 Drugi dzień Bożego Narodzenia
    ");
}

#[test]
fn christmas_eve_is_a_holiday_from_2025() {
    assert!(!PolishHolidays.is_public_holiday(d(2024, 12, 24)));
    assert!(PolishHolidays.is_public_holiday(d(2025, 12, 24)));
    assert!(!NoHolidays.is_public_holiday(d(2025, 12, 25)));
}

#[test]
fn trading_sunday_policies() {
    let all = SundayPolicy::All;
    let never = SundayPolicy::Never;
    let custom = SundayPolicy::Custom(BTreeSet::from([d(2025, 12, 14), d(2025, 12, 15)]));

    for date in d(2025, 1, 1).iter_days().take_while(|x| x.year() == 2025) {
        let sunday = date.weekday() == chrono::Weekday::Sun;
        assert_eq!(is_trading_sunday(date, &all), sunday);
        assert!(!is_trading_sunday(date, &never));
        assert_eq!(is_non_trading_sunday(date, &never), sunday);
        assert!(!is_non_trading_sunday(date, &all));
    }
    assert!(is_trading_sunday(d(2025, 12, 14), &custom));
    assert!(!is_trading_sunday(d(2025, 12, 15), &custom));
    assert!(is_non_trading_sunday(d(2025, 12, 21), &custom));
}

#[test]
fn sunday_policy_serde() {
    let policy: SundayPolicy = serde_json::from_str(r#"{"mode":"none"}"#).unwrap();
    assert_eq!(policy, SundayPolicy::Never);
    let policy: SundayPolicy =
        serde_json::from_str(r#"{"mode":"custom","dates":["2025-12-14","2025-12-21"]}"#).unwrap();
    assert_eq!(
        policy,
        SundayPolicy::Custom(BTreeSet::from([d(2025, 12, 14), d(2025, 12, 21)]))
    );
    assert_eq!(serde_json::to_string(&SundayPolicy::All).unwrap(), r#"{"mode":"all"}"#);
}

#[test]
fn oracle_classification() {
    let never = SundayPolicy::Never;
    let oracle = CalendarOracle::new(&PolishHolidays, &never);

    assert_eq!(oracle.classify(d(2025, 3, 3)), DayKind::Working);
    assert_eq!(oracle.classify(d(2025, 3, 9)), DayKind::NonTradingSunday);
    assert_eq!(
        oracle.classify(d(2025, 4, 20)),
        DayKind::PublicHoliday("Wielkanoc")
    );
    assert_eq!(
        oracle.classify(d(2025, 11, 11)).to_string(),
        "public holiday (Narodowe Święto Niepodległości)"
    );
    assert!(oracle.is_non_working(d(2025, 3, 9)));
    assert!(!oracle.is_non_working(d(2025, 3, 8)));
}

#[test]
fn weekend_keys() {
    assert_eq!(weekend_start(d(2025, 3, 8)), Some(d(2025, 3, 8)));
    assert_eq!(weekend_start(d(2025, 3, 9)), Some(d(2025, 3, 8)));
    assert_eq!(weekend_start(d(2025, 3, 10)), None);
}

#[test]
fn required_hours_by_contract() {
    let policy = StandardHours::default();
    let sundays = SundayPolicy::All;
    let oracle = CalendarOracle::new(&PolishHolidays, &sundays);

    let full = Employee::new("a", "A");
    let half = Employee::new("b", "B").with_employment(EmploymentType::Half);
    let mut custom = Employee::new("c", "C").with_employment(EmploymentType::Custom);

    assert_eq!(eligible_days(2025, 3, &oracle, &policy), 21);
    assert_eq!(required_hours_for(&full, 2025, 3, &oracle, &policy), 168.0);
    assert_eq!(required_hours_for(&half, 2025, 3, &oracle, &policy), 84.0);
    // 1er mai férié
    assert_eq!(required_hours_for(&full, 2025, 5, &oracle, &policy), 168.0);

    assert_eq!(required_hours_for(&custom, 2025, 3, &oracle, &policy), 0.0);
    custom.weekly_hours = Some(20.0);
    assert_eq!(required_hours_for(&custom, 2025, 3, &oracle, &policy), 84.0);
    custom.custom_hours = Some(100.0);
    assert_eq!(required_hours_for(&custom, 2025, 3, &oracle, &policy), 100.0);
}

#[test]
fn half_time_is_half_of_full_time() {
    let policy = StandardHours::default();
    let sundays = SundayPolicy::All;
    let oracle = CalendarOracle::new(&PolishHolidays, &sundays);
    let full = Employee::new("a", "A");
    let half = Employee::new("b", "B").with_employment(EmploymentType::Half);
    for month in 1..=12 {
        let f = required_hours_for(&full, 2025, month, &oracle, &policy);
        let h = required_hours_for(&half, 2025, month, &oracle, &policy);
        assert!((h - f / 2.0).abs() < 1e-9, "month {month}");
    }
}

#[test]
fn trading_sundays_can_count_towards_target() {
    let policy = StandardHours {
        count_trading_sundays: true,
        ..StandardHours::default()
    };
    let all = SundayPolicy::All;
    let never = SundayPolicy::Never;
    let full = Employee::new("a", "A");

    let oracle = CalendarOracle::new(&PolishHolidays, &all);
    assert_eq!(required_hours_for(&full, 2025, 3, &oracle, &policy), 208.0);
    let oracle = CalendarOracle::new(&PolishHolidays, &never);
    assert_eq!(required_hours_for(&full, 2025, 3, &oracle, &policy), 168.0);
}
