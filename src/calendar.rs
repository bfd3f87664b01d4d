//! Calendrier : jours fériés et dimanches commerciaux.
//!
//! Un jour est **non travaillé** pour la couverture ssi il est férié, ou
//! s'il s'agit d'un dimanche non commercial selon la politique choisie.
//! Les fêtes mobiles sont calculées (algorithme grégorien anonyme), pas
//! tabulées : aucune donnée externe n'est nécessaire.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Source de jours fériés.
pub trait HolidayCalendar: fmt::Debug + Send + Sync {
    /// Nom du jour férié, `None` si jour ordinaire.
    fn holiday_name(&self, date: NaiveDate) -> Option<&'static str>;

    fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}

/// Jours fériés légaux polonais.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolishHolidays;

impl HolidayCalendar for PolishHolidays {
    fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        let fixed = match (date.month(), date.day()) {
            (1, 1) => Some("Nowy Rok"),
            (1, 6) => Some("Święto Trzech Króli"),
            (5, 1) => Some("Święto Pracy"),
            (5, 3) => Some("Święto Konstytucji 3 Maja"),
            (8, 15) => Some("Wniebowzięcie Najświętszej Maryi Panny"),
            (11, 1) => Some("Wszystkich Świętych"),
            (11, 11) => Some("Narodowe Święto Niepodległości"),
            // férié depuis 2025
            (12, 24) if date.year() >= 2025 => Some("Wigilia Bożego Narodzenia"),
            (12, 25) => Some("Boże Narodzenie"),
            (12, 26) => Some("Drugi dzień Bożego Narodzenia"),
            _ => None,
        };
        if fixed.is_some() {
            return fixed;
        }

        let easter = easter_sunday(date.year())?;
        match (date - easter).num_days() {
            0 => Some("Wielkanoc"),
            1 => Some("Poniedziałek Wielkanocny"),
            49 => Some("Zielone Świątki"),
            60 => Some("Boże Ciało"),
            _ => None,
        }
    }
}

/// Calendrier sans aucun jour férié.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn holiday_name(&self, _date: NaiveDate) -> Option<&'static str> {
        None
    }
}

/// Dimanche de Pâques (calendrier grégorien, Meeus/Jones/Butcher).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Politique d'ouverture dominicale de l'organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", content = "dates", rename_all = "lowercase")]
pub enum SundayPolicy {
    /// Tous les dimanches sont travaillés.
    #[default]
    All,
    /// Aucun dimanche n'est travaillé.
    #[serde(rename = "none")]
    Never,
    /// Liste explicite de dimanches commerciaux.
    Custom(BTreeSet<NaiveDate>),
}

pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Toujours `false` hors dimanche, quelle que soit la politique.
pub fn is_trading_sunday(date: NaiveDate, policy: &SundayPolicy) -> bool {
    if !is_sunday(date) {
        return false;
    }
    match policy {
        SundayPolicy::All => true,
        SundayPolicy::Never => false,
        SundayPolicy::Custom(dates) => dates.contains(&date),
    }
}

pub fn is_non_trading_sunday(date: NaiveDate, policy: &SundayPolicy) -> bool {
    is_sunday(date) && !is_trading_sunday(date, policy)
}

/// Samedi ouvrant le week-end auquel appartient `date` (samedi ou dimanche).
pub fn weekend_start(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => Some(date),
        Weekday::Sun => Some(date - Duration::days(1)),
        _ => None,
    }
}

/// Classification d'une date pour la couverture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Working,
    PublicHoliday(&'static str),
    NonTradingSunday,
}

impl DayKind {
    pub fn is_working(self) -> bool {
        matches!(self, DayKind::Working)
    }
}

impl fmt::Display for DayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKind::Working => f.write_str("working day"),
            DayKind::PublicHoliday(name) => write!(f, "public holiday ({name})"),
            DayKind::NonTradingSunday => f.write_str("non-trading Sunday"),
        }
    }
}

/// Oracle combinant jours fériés et politique dominicale.
#[derive(Debug, Clone, Copy)]
pub struct CalendarOracle<'a> {
    holidays: &'a dyn HolidayCalendar,
    sundays: &'a SundayPolicy,
}

impl<'a> CalendarOracle<'a> {
    pub fn new(holidays: &'a dyn HolidayCalendar, sundays: &'a SundayPolicy) -> Self {
        Self { holidays, sundays }
    }

    pub fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.is_public_holiday(date)
    }

    pub fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        self.holidays.holiday_name(date)
    }

    pub fn is_trading_sunday(&self, date: NaiveDate) -> bool {
        is_trading_sunday(date, self.sundays)
    }

    pub fn is_non_trading_sunday(&self, date: NaiveDate) -> bool {
        is_non_trading_sunday(date, self.sundays)
    }

    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        !self.classify(date).is_working()
    }

    /// Un jour férié prime sur le statut dominical.
    pub fn classify(&self, date: NaiveDate) -> DayKind {
        if let Some(name) = self.holidays.holiday_name(date) {
            DayKind::PublicHoliday(name)
        } else if self.is_non_trading_sunday(date) {
            DayKind::NonTradingSunday
        } else {
            DayKind::Working
        }
    }
}

/// Liste des jours fériés d'une année, dans l'ordre chronologique.
pub fn holidays_in_year(
    calendar: &dyn HolidayCalendar,
    year: i32,
) -> Vec<(NaiveDate, &'static str)> {
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.year() == year)
        .filter_map(|d| calendar.holiday_name(d).map(|name| (d, name)))
        .collect()
}
