//! liftlog - Personal strength training tracker

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use liftlog::analytics::personal_records;
use liftlog::analytics::recovery::NEVER_TRAINED_DAYS;
use liftlog::analytics::weekly_volume::TrackerCheckpoint;
use liftlog::analytics::{
    ConsistencyAnalyzer, RecoveryAnalyzer, SupersetRotator, TrendAggregator, TrendInterval, TrendMetric,
    TrendPeriod, WeeklyVolumeTracker,
};
use liftlog::analytics::trend::TrendPoint;
use liftlog::db::{Database, ExerciseRow};
use liftlog::store::SetRecord;
use liftlog::exercises::MuscleGroup;
use liftlog::{Calendar, WorkoutStore};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(author, version, about = "Personal strength training tracker")]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "LIFTLOG_DB", default_value = "liftlog.db", global = true)]
    db: String,

    /// Hours east of UTC used for day and week boundaries
    #[arg(long, env = "LIFTLOG_UTC_OFFSET_HOURS", default_value = "0", allow_hyphen_values = true, global = true)]
    utc_offset_hours: i32,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a set into the open workout (starting one if needed)
    Log {
        /// Exercise name (e.g., "bench press", "squat")
        exercise: String,

        /// Weight lifted
        #[arg(short, long)]
        weight: Option<f64>,

        /// Repetitions
        #[arg(short, long)]
        reps: Option<u32>,

        /// Rate of perceived exertion
        #[arg(long)]
        rpe: Option<f32>,

        /// Mark as warm-up set
        #[arg(long)]
        warmup: bool,
    },

    /// Finish the open workout
    Finish,

    /// Personal records for an exercise
    Records {
        exercise: String,
    },

    /// This week's volume against last week
    Weekly,

    /// Consistency score, streaks and heat map
    Consistency,

    /// Recovery status per muscle group
    Recovery,

    /// Volume or estimated 1RM over time
    Trend {
        /// Exercise name; all exercises when omitted
        exercise: Option<String>,

        #[arg(short, long, value_enum, default_value = "volume")]
        metric: MetricArg,

        #[arg(short, long, value_enum, default_value = "workout")]
        interval: IntervalArg,

        #[arg(short, long, value_enum, default_value = "quarter")]
        period: PeriodArg,
    },

    /// Print the rotation order of a superset
    Superset {
        /// Two or more exercise names
        exercises: Vec<String>,

        /// Number of rounds to print
        #[arg(short, long, default_value = "3")]
        rounds: usize,
    },

    /// List known exercises
    Exercises,

    /// Add a custom exercise
    AddExercise {
        name: String,

        /// Primary muscle group (e.g., "chest")
        #[arg(short, long)]
        muscle: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricArg {
    /// Sum of weight x reps
    Volume,
    /// Best single-set estimated 1RM
    E1rm,
}

impl From<MetricArg> for TrendMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Volume => TrendMetric::Volume,
            MetricArg::E1rm => TrendMetric::E1rm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IntervalArg {
    Workout,
    Day,
    Week,
}

impl From<IntervalArg> for TrendInterval {
    fn from(arg: IntervalArg) -> Self {
        match arg {
            IntervalArg::Workout => TrendInterval::Workout,
            IntervalArg::Day => TrendInterval::Day,
            IntervalArg::Week => TrendInterval::Week,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PeriodArg {
    Month,
    Quarter,
    HalfYear,
    Year,
    All,
}

impl From<PeriodArg> for TrendPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Month => TrendPeriod::Month,
            PeriodArg::Quarter => TrendPeriod::Quarter,
            PeriodArg::HalfYear => TrendPeriod::HalfYear,
            PeriodArg::Year => TrendPeriod::Year,
            PeriodArg::All => TrendPeriod::All,
        }
    }
}

#[derive(Serialize)]
struct TrendReport {
    exercise: Option<String>,
    metric: TrendMetric,
    interval: TrendInterval,
    period: TrendPeriod,
    points: Vec<TrendPoint>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn find_exercise(db: &Database, name: &str) -> Result<ExerciseRow> {
    db.find_exercise(name)?
        .ok_or_else(|| anyhow!("Unknown exercise: {name} (see `liftlog exercises`)"))
}

/// Refresh the persisted weekly tracker and show the celebration once
fn refresh_weekly(db: &Database, calendar: Calendar, json: bool) -> Result<()> {
    let checkpoint = db.load_weekly_checkpoint()?.unwrap_or_default();
    let mut tracker = WeeklyVolumeTracker::from_checkpoint(calendar, checkpoint);
    let state = tracker.refresh(db, Utc::now())?;

    if json {
        print_json(&state)?;
    } else if state.is_first_week {
        println!("This week: {:.0} (no volume last week)", state.current_week_volume);
    } else {
        println!(
            "This week: {:.0} / {:.0} last week ({:.0}%)",
            state.current_week_volume,
            state.last_week_volume,
            state.progress_ratio * 100.0
        );
    }
    if state.just_overflowed {
        if !json {
            println!("*** You passed last week's volume! ***");
        }
        tracker.clear_overflow_animation();
    }

    save_weekly(db, &tracker.checkpoint())
}

fn save_weekly(db: &Database, checkpoint: &TrackerCheckpoint) -> Result<()> {
    db.save_weekly_checkpoint(checkpoint).context("saving weekly tracker")
}

fn heat_char(level: u8) -> char {
    match level {
        0 => '.',
        1 => '-',
        2 => '+',
        _ => '#',
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let calendar = Calendar::with_offset_hours(cli.utc_offset_hours)
        .ok_or_else(|| anyhow!("UTC offset out of range: {}", cli.utc_offset_hours))?;
    let db = Database::open(&cli.db, calendar)?;

    match cli.command {
        Some(Commands::Log { exercise, weight, reps, rpe, warmup }) => {
            let exercise = find_exercise(&db, &exercise)?;
            let now = Utc::now();
            let workout_id = match db.open_workout()? {
                Some(id) => id,
                None => db.start_workout(now)?,
            };

            let records = personal_records::load(&db, exercise.id)?;
            let set = SetRecord {
                id: None,
                exercise_id: exercise.id,
                workout_id,
                weight,
                reps,
                rpe,
                is_warmup: warmup,
                is_complete: true,
                timestamp: now,
            };
            db.add_set(&set)?;

            println!(
                "Logged: {} - {}x{}{}",
                exercise.name,
                weight.map_or("-".to_string(), |w| format!("{w}")),
                reps.map_or("-".to_string(), |r| r.to_string()),
                if warmup { " (warm-up)" } else { "" }
            );
            if let (true, Some(w), Some(r)) = (set.is_working(), weight, reps)
                && records.is_new_record(w, r)
            {
                println!("New personal record: {w} x {r}");
            }

            let session = WeeklyVolumeTracker::session_contribution(&db, workout_id)?;
            println!("Session volume: {session:.0}");
            refresh_weekly(&db, calendar, cli.json)?;
        }

        Some(Commands::Finish) => {
            let Some(workout_id) = db.open_workout()? else {
                bail!("No open workout");
            };
            db.finish_workout(workout_id, Utc::now())?;
            let session = WeeklyVolumeTracker::session_contribution(&db, workout_id)?;
            println!("Workout {workout_id} finished, volume {session:.0}");
            refresh_weekly(&db, calendar, cli.json)?;
        }

        Some(Commands::Records { exercise }) => {
            let exercise = find_exercise(&db, &exercise)?;
            let records = personal_records::load(&db, exercise.id)?;
            if cli.json {
                return print_json(&records);
            }

            println!("Records: {}", exercise.name);
            println!("{:-<40}", "");
            match &records.heaviest {
                Some(set) => println!(
                    "Heaviest: {} x {} ({})",
                    set.weight.unwrap_or_default(),
                    set.reps.unwrap_or_default(),
                    set.timestamp.format("%Y-%m-%d")
                ),
                None => println!("No working sets yet"),
            }
            if let Some(best) = &records.best_e1rm {
                println!("Best E1RM: {:.1} ({})", best.estimate, best.set.timestamp.format("%Y-%m-%d"));
            }
            if let Some(best) = &records.best_e10rm {
                println!("Best E10RM: {:.1} ({})", best.estimate, best.set.timestamp.format("%Y-%m-%d"));
            }
            for entry in records.rep_records.values() {
                println!(
                    "{:>3} reps: {:>6.1} (since {})",
                    entry.reps,
                    entry.max_weight,
                    entry.first_achieved.format("%Y-%m-%d")
                );
            }
        }

        Some(Commands::Weekly) | None => {
            refresh_weekly(&db, calendar, cli.json)?;
        }

        Some(Commands::Consistency) => {
            let report = ConsistencyAnalyzer::analyze(&db, &calendar, Utc::now())?;
            if report.is_new_best_streak {
                db.update_best_streak_if_needed(report.current_streak)?;
            }
            if cli.json {
                return print_json(&report);
            }

            println!("Consistency: {}% ({} of 52 weeks)", report.score, report.active_weeks);
            println!("Streak: {} days (best {})", report.current_streak, report.best_streak);
            println!(
                "This year: {} workouts, {:.0} volume",
                report.year_to_date_workouts, report.year_to_date_volume
            );
            println!();
            // One row per weekday offset, one column per week
            for row in 0..7 {
                let line: String = report.heat_map.cells.iter().skip(row).step_by(7).map(|c| heat_char(c.level)).collect();
                println!("{line}");
            }
        }

        Some(Commands::Recovery) => {
            let recovery = RecoveryAnalyzer::load(&db, Utc::now())?;
            if cli.json {
                return print_json(&recovery);
            }
            for muscle in recovery {
                let since = if muscle.days_since >= NEVER_TRAINED_DAYS {
                    "never".to_string()
                } else {
                    format!("{:.1}d ago", muscle.days_since)
                };
                println!("{:12} {:10} {}", muscle.muscle, muscle.status.label(), since);
            }
        }

        Some(Commands::Trend { exercise, metric, interval, period }) => {
            let exercise = match exercise {
                Some(name) => Some(find_exercise(&db, &name)?),
                None => None,
            };
            let metric: TrendMetric = metric.into();
            let interval: TrendInterval = interval.into();
            let period: TrendPeriod = period.into();
            let points = TrendAggregator::load(
                &db,
                &calendar,
                exercise.as_ref().map(|e| e.id),
                period,
                metric,
                interval,
                Utc::now(),
            )?;
            if cli.json {
                let exercise = exercise.map(|e| e.name);
                return print_json(&TrendReport { exercise, metric, interval, period, points });
            }
            if points.is_empty() {
                println!("No working sets in this period");
            }
            for point in points {
                let day = point.bucket_start.with_timezone(&calendar.offset());
                println!("{} {:>10.1}", day.format("%Y-%m-%d"), point.value);
            }
        }

        Some(Commands::Superset { exercises, rounds }) => {
            let mut ids = Vec::with_capacity(exercises.len());
            for name in &exercises {
                ids.push(find_exercise(&db, name)?);
            }

            let mut rotator = SupersetRotator::new();
            let session = rotator.start(ids.iter().map(|e| e.id).collect())?;
            println!("Superset {}", session.group_id);

            let name_of = |id: i64| ids.iter().find(|e| e.id == id).map_or("?", |e| e.name.as_str());
            for round in 1..=rounds {
                let mut order = Vec::with_capacity(ids.len());
                for _ in 0..ids.len() {
                    if let Some(current) = rotator.current_exercise_id() {
                        order.push(name_of(current));
                    }
                    rotator.advance()?;
                }
                println!("Round {round}: {}", order.join(" -> "));
            }
            rotator.stop();
        }

        Some(Commands::Exercises) => {
            for exercise in db.get_exercises()? {
                println!("{:4} {:28} {}", exercise.id, exercise.name, exercise.target_muscle);
            }
        }

        Some(Commands::AddExercise { name, muscle }) => {
            if MuscleGroup::from_name(&muscle).is_none() {
                println!("Note: {muscle} is not a tracked muscle group, recovery lists it separately");
            }
            let id = db.add_exercise(&name, &muscle)?;
            println!("Added: {name} ({muscle}), id {id}");
        }
    }

    Ok(())
}
