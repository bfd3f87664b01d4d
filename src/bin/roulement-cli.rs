#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use roulement::{
    calendar::{self, SundayPolicy},
    changeset::Changeset,
    config::{load_config_from_file, GenerationConfig},
    hours::{self, StandardHours},
    io,
    model::{EmployeeId, ShiftId, TemplateId, TimeOfDay},
    scheduler::{AssignOptions, Scheduler, ShiftRequest},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI locale de génération de plannings (fichier JSON, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du roster
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Sundays {
    All,
    None,
    Custom,
}

/// `--trading-sunday` n'a de sens qu'avec `--sundays custom`.
fn sunday_policy(mode: Sundays, dates: Vec<NaiveDate>) -> Result<SundayPolicy> {
    match mode {
        Sundays::Custom => Ok(SundayPolicy::Custom(dates.into_iter().collect())),
        _ if !dates.is_empty() => bail!("--trading-sunday requires --sundays custom"),
        Sundays::All => Ok(SundayPolicy::All),
        Sundays::None => Ok(SundayPolicy::Never),
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des salariés depuis un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
    },

    /// Importer des gabarits de créneaux depuis un CSV
    ImportTemplates {
        #[arg(long)]
        csv: String,
    },

    /// Importer des absences depuis un CSV
    ImportAbsences {
        #[arg(long)]
        csv: String,
    },

    /// Générer le planning d'une période
    Generate {
        /// Configuration JSON de génération
        #[arg(long)]
        config: String,
        /// Remplace la date de début (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Remplace la date de fin (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// N'écrit pas le roster
        #[arg(long)]
        dry_run: bool,
        /// Export JSON du résultat
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Ajouter un shift à la main
    Assign {
        #[arg(long)]
        employee: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        template: String,
        /// Remplace l'heure de début du gabarit (HH:MM)
        #[arg(long)]
        start: Option<TimeOfDay>,
        /// Remplace l'heure de fin du gabarit (HH:MM)
        #[arg(long)]
        end: Option<TimeOfDay>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, default_value_t = 11.0)]
        min_rest_hours: f64,
        #[arg(long, default_value_t = 6)]
        max_consecutive_days: u32,
    },

    /// Supprimer un shift
    Remove {
        #[arg(long)]
        shift_id: String,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier les conflits
    Check {
        #[arg(long, default_value_t = 11.0)]
        min_rest_hours: f64,
        #[arg(long, default_value_t = 6)]
        max_consecutive_days: u32,
    },

    /// Heures dues et planifiées par salarié pour un mois
    Hours {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long, value_enum, default_value_t = Sundays::All)]
        sundays: Sundays,
        /// Dimanche commercial (YYYY-MM-DD), répétable, avec `--sundays custom`
        #[arg(long = "trading-sunday")]
        trading_sundays: Vec<NaiveDate>,
        /// Compte les dimanches commerciaux dans l'objectif
        #[arg(long)]
        count_sundays: bool,
    },

    /// Lister les jours fériés d'une année
    Holidays {
        #[arg(long)]
        year: Option<i32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster)?;
    let mut scheduler = Scheduler::from_roster(storage.load_or_default()?);

    let code = match cli.cmd {
        Commands::ImportEmployees { csv } => {
            let employees = io::import_employees_csv(csv)?;
            println!("{} employee(s) imported", employees.len());
            scheduler.add_employees(employees);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::ImportTemplates { csv } => {
            let templates = io::import_templates_csv(csv)?;
            println!("{} template(s) imported", templates.len());
            scheduler.add_templates(templates);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::ImportAbsences { csv } => {
            let absences = io::import_absences_csv(csv)?;
            println!("{} absence(s) imported", absences.len());
            scheduler.add_absences(absences);
            storage.save(scheduler.roster())?;
            0
        }
        Commands::Generate {
            config,
            from,
            to,
            dry_run,
            out_json,
        } => {
            let mut config: GenerationConfig = load_config_from_file(&config)?;
            if let Some(from) = from {
                config.start_date = from;
            }
            if let Some(to) = to {
                config.end_date = to;
            }
            let result = scheduler.generate(&config)?;
            if let Some(path) = out_json {
                io::export_result_json(path, &result)?;
            }
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
            println!(
                "{} shift(s) generated, {} unfilled slot(s), {} day(s) skipped",
                result.stats.total_shifts,
                result.unfilled_slots.len(),
                result.skipped_days.len()
            );
            if !dry_run {
                let mut changes = Changeset::new(scheduler.roster().shifts.clone());
                changes.stage_generated(result.shifts.clone())?;
                let plan = changes.commit(&storage)?;
                println!("{} shift(s) saved", plan.inserts.len());
            }
            // Code 2 = WARNING/INCOMPLETE
            if result.is_complete() {
                0
            } else {
                2
            }
        }
        Commands::Assign {
            employee,
            date,
            template,
            start,
            end,
            notes,
            min_rest_hours,
            max_consecutive_days,
        } => {
            let template = scheduler
                .roster()
                .find_template(&TemplateId::new(&template))
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unknown template: {}", template))?;
            let mut request = ShiftRequest::from_template(&template, EmployeeId::new(employee), date);
            request.start = start.unwrap_or(request.start);
            request.end = end.unwrap_or(request.end);
            if request.start == request.end {
                bail!("shift start and end must differ");
            }
            request.notes = notes;
            let opts = AssignOptions {
                min_rest_hours,
                max_consecutive_days,
            };
            let shift = scheduler.propose(&request, opts)?;
            let mut changes = Changeset::new(scheduler.roster().shifts.clone());
            let id = changes.add(shift)?;
            changes.commit(&storage)?;
            println!("{id}");
            0
        }
        Commands::Remove { shift_id } => {
            let mut changes = Changeset::new(scheduler.roster().shifts.clone());
            changes.remove(&ShiftId::new(shift_id))?;
            let plan = changes.commit(&storage)?;
            println!("{} shift(s) deleted", plan.deletes.len());
            0
        }
        Commands::List { out_json, out_csv } => {
            let roster = scheduler.roster();
            let mut shifts: Vec<_> = roster.live_shifts().cloned().collect();
            shifts.sort_by(|a, b| (a.date, a.start).cmp(&(b.date, b.start)));
            if let Some(path) = out_json {
                io::export_roster_json(path, roster)?;
            }
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, roster, &shifts)?;
            }
            // impression compacte
            for s in &shifts {
                let name = roster
                    .find_employee(&s.employee_id)
                    .map(|e| e.name.as_str())
                    .unwrap_or("-");
                println!(
                    "{} | {} {} → {} | {}",
                    s.id.as_str(),
                    s.date,
                    s.start,
                    s.end,
                    name
                );
            }
            0
        }
        Commands::Check {
            min_rest_hours,
            max_consecutive_days,
        } => {
            let opts = AssignOptions {
                min_rest_hours,
                max_consecutive_days,
            };
            let conflicts = scheduler.detect_conflicts(opts);
            if conflicts.is_empty() {
                println!("OK: aucun conflit");
                0
            } else {
                for c in &conflicts {
                    println!(
                        "{} | {} / {} | {}",
                        c.employee,
                        c.shift_a.as_str(),
                        c.shift_b.as_str(),
                        c.kind
                    );
                }
                2
            }
        }
        Commands::Hours {
            year,
            month,
            sundays,
            trading_sundays,
            count_sundays,
        } => {
            let today = Utc::now().date_naive();
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            if !(1..=12).contains(&month) {
                bail!("month must be between 1 and 12");
            }
            let policy = StandardHours {
                count_trading_sundays: count_sundays,
                ..StandardHours::default()
            };
            let sundays = sunday_policy(sundays, trading_sundays)?;
            let roster = scheduler.roster();
            for employee in roster.employees.iter().filter(|e| e.active) {
                let required = scheduler.required_hours(employee, year, month, &sundays, &policy);
                let worked = hours::worked_hours(roster.live_shifts().filter(|s| {
                    s.employee_id == employee.id && s.date.year() == year && s.date.month() == month
                }));
                println!(
                    "{} | {} | required {:.2} | scheduled {:.2}",
                    employee.id, employee.name, required, worked
                );
            }
            0
        }
        Commands::Holidays { year } => {
            let year = year.unwrap_or(Utc::now().year());
            for (date, name) in calendar::holidays_in_year(scheduler.holidays(), year) {
                println!("{date} {name}");
            }
            0
        }
    };

    std::process::exit(code);
}
