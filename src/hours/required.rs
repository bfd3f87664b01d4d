use crate::calendar::CalendarOracle;
use crate::model::{Employee, EmploymentType};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Politique d'objectif horaire mensuel.
///
/// Les constantes journalières dépendent de la convention collective :
/// elles sont injectées, jamais codées en dur dans le générateur.
pub trait HoursPolicy: fmt::Debug + Send + Sync {
    /// Heures dues par jour ouvré pour un type de contrat à temps fixe.
    fn daily_hours(&self, employment: EmploymentType) -> f64;

    /// Le jour compte-t-il dans la base de calcul ?
    fn counts_day(&self, date: NaiveDate, oracle: &CalendarOracle<'_>) -> bool;
}

/// Politique par défaut : 8h/jour à temps plein, 4h à mi-temps, du lundi
/// au vendredi hors jours fériés.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardHours {
    pub full_daily_hours: f64,
    pub half_daily_hours: f64,
    /// Compte aussi les dimanches commerciaux comme jours ouvrés.
    pub count_trading_sundays: bool,
}

impl Default for StandardHours {
    fn default() -> Self {
        Self {
            full_daily_hours: 8.0,
            half_daily_hours: 4.0,
            count_trading_sundays: false,
        }
    }
}

impl HoursPolicy for StandardHours {
    fn daily_hours(&self, employment: EmploymentType) -> f64 {
        match employment {
            EmploymentType::Full => self.full_daily_hours,
            EmploymentType::Half => self.half_daily_hours,
            EmploymentType::Custom => 0.0,
        }
    }

    fn counts_day(&self, date: NaiveDate, oracle: &CalendarOracle<'_>) -> bool {
        if oracle.is_non_working(date) {
            return false;
        }
        match date.weekday() {
            Weekday::Sat => false,
            Weekday::Sun => self.count_trading_sundays && oracle.is_trading_sunday(date),
            _ => true,
        }
    }
}

/// Nombre de jours du mois retenus par la politique.
pub fn eligible_days(
    year: i32,
    month: u32,
    oracle: &CalendarOracle<'_>,
    policy: &dyn HoursPolicy,
) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| policy.counts_day(*d, oracle))
        .count() as u32
}

/// Objectif contractuel pour un mois donné.
///
/// - `custom` : la valeur fournie telle quelle (0 si absente).
/// - `full`/`half` : jours retenus × constante journalière du type.
pub fn required_hours(
    year: i32,
    month: u32,
    oracle: &CalendarOracle<'_>,
    employment: EmploymentType,
    custom_hours: Option<f64>,
    policy: &dyn HoursPolicy,
) -> f64 {
    match employment {
        EmploymentType::Custom => custom_hours.unwrap_or(0.0).max(0.0),
        EmploymentType::Full | EmploymentType::Half => {
            f64::from(eligible_days(year, month, oracle, policy)) * policy.daily_hours(employment)
        }
    }
}

/// Objectif d'un salarié. Un contrat `custom` sans valeur explicite se
/// rabat sur `weekly_hours` ramené au jour (semaine de 5 jours).
pub fn required_hours_for(
    employee: &Employee,
    year: i32,
    month: u32,
    oracle: &CalendarOracle<'_>,
    policy: &dyn HoursPolicy,
) -> f64 {
    match (employee.employment, employee.custom_hours, employee.weekly_hours) {
        (EmploymentType::Custom, None, Some(weekly)) => {
            f64::from(eligible_days(year, month, oracle, policy)) * weekly.max(0.0) / 5.0
        }
        (employment, custom, _) => {
            required_hours(year, month, oracle, employment, custom, policy)
        }
    }
}
