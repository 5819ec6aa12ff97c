//! Command execution
//!
//! Every command fetches once through a [`TelemetrySource`] and turns the
//! acquisition into a [`Report`]. Missing data and analytics failures end up
//! as [`Report::Unavailable`], never as an error.

use crate::cli::{Commands, TrackArgs};
use crate::settings::Settings;
use anyhow::Result;
use serde::Serialize;
use tracing::debug;
use trv_adapters::{LapSource, LuminositySource};
use trv_core::analytics::{self, LapSpeed};
use trv_core::chart::{LapTimeChart, ScheduleChart, SpeedChart};
use trv_core::{
    Acquisition, AnalyticsError, LapRecord, LapSeries, LastN, LuminosityReading, LuminositySeries,
    Origin, Series, TelemetrySource, TrackLength,
};

/// Lap analytics command with validated inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LapQuery {
    Schedule,
    LapTimes,
    Speed { track: TrackLength },
    Fastest { track: TrackLength },
    Slowest { track: TrackLength },
    Lap { number: u32, track: TrackLength },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extreme {
    Fastest,
    Slowest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Report {
    Schedule(ScheduleChart),
    LapTimes(LapTimeChart),
    Speeds(SpeedChart),
    /// Extreme lap by duration, and by average speed when one is computable
    Extremes {
        extreme: Extreme,
        lap: LapRecord,
        speed: Result<LapSpeed, String>,
    },
    Lap(LapSpeed),
    Luminosity(LuminositySeries),
    /// No data, or nothing computable from it
    Unavailable(String),
}

/// A report plus where its data came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub origin: Option<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
    pub report: Report,
}

impl Outcome {
    pub fn unavailable(reason: impl ToString) -> Self {
        Self {
            origin: None,
            remote_error: None,
            report: Report::Unavailable(reason.to_string()),
        }
    }
}

/// Validate inputs, build the source the command needs and run it.
///
/// Fails only on bad input that should abort the process (lastN out of
/// range) or when the HTTP client cannot be built.
pub fn run(command: &Commands, settings: &Settings) -> Result<Outcome> {
    let limit = settings.source.last_n(command.fetch_args().last_n)?;

    let query = match lap_query(command) {
        Ok(query) => query,
        Err(e) => return Ok(Outcome::unavailable(e)),
    };

    match query {
        Some(query) => {
            let source = LapSource::new(settings.source.clone())?;
            Ok(run_lap_query(
                &source,
                limit,
                query,
                settings.display_utc_offset_hours,
            ))
        }
        None => {
            let source = LuminositySource::new(settings.source.clone())?;
            Ok(run_luminosity(&source, limit))
        }
    }
}

/// `None` for commands that are not lap analytics
fn lap_query(command: &Commands) -> Result<Option<LapQuery>, AnalyticsError> {
    let track = |args: &TrackArgs| TrackLength::new(args.track_length);

    let query = match command {
        Commands::Schedule { .. } => LapQuery::Schedule,
        Commands::LapTimes { .. } => LapQuery::LapTimes,
        Commands::Speed { track: t, .. } => LapQuery::Speed { track: track(t)? },
        Commands::Fastest { track: t, .. } => LapQuery::Fastest { track: track(t)? },
        Commands::Slowest { track: t, .. } => LapQuery::Slowest { track: track(t)? },
        Commands::Lap {
            track: t, number, ..
        } => LapQuery::Lap {
            number: *number,
            track: track(t)?,
        },
        Commands::Luminosity { .. } => return Ok(None),
    };
    Ok(Some(query))
}

pub fn run_lap_query<S>(source: &S, limit: LastN, query: LapQuery, utc_offset_hours: i32) -> Outcome
where
    S: TelemetrySource<Record = LapRecord>,
{
    debug!("Running {:?} against {}", query, source.name());

    fetch_and_report(source, limit, |series: LapSeries| match query {
        LapQuery::Schedule => ScheduleChart::build(&series, utc_offset_hours).map(Report::Schedule),
        LapQuery::LapTimes => LapTimeChart::build(&series).map(Report::LapTimes),
        LapQuery::Speed { track } => SpeedChart::build(&series, track).map(Report::Speeds),
        LapQuery::Fastest { track } => extremes(&series, track, Extreme::Fastest),
        LapQuery::Slowest { track } => extremes(&series, track, Extreme::Slowest),
        LapQuery::Lap { number, track } => {
            analytics::lap_speed(&series, track, number).map(Report::Lap)
        }
    })
}

pub fn run_luminosity<S>(source: &S, limit: LastN) -> Outcome
where
    S: TelemetrySource<Record = LuminosityReading>,
{
    fetch_and_report(source, limit, |series| Ok(Report::Luminosity(series)))
}

fn extremes(
    series: &LapSeries,
    track: TrackLength,
    extreme: Extreme,
) -> Result<Report, AnalyticsError> {
    let (lap, speed) = match extreme {
        Extreme::Fastest => (
            analytics::fastest_lap(series)?,
            analytics::fastest_average_speed(series, track),
        ),
        Extreme::Slowest => (
            analytics::slowest_lap(series)?,
            analytics::slowest_average_speed(series, track),
        ),
    };
    Ok(Report::Extremes {
        extreme,
        lap: lap.clone(),
        speed: speed.map_err(|e| e.to_string()),
    })
}

fn fetch_and_report<S, F>(source: &S, limit: LastN, report: F) -> Outcome
where
    S: TelemetrySource,
    F: FnOnce(Series<S::Record>) -> Result<Report, AnalyticsError>,
{
    let into_report = |result: Result<Report, AnalyticsError>| {
        result.unwrap_or_else(|e| Report::Unavailable(e.to_string()))
    };

    match source.fetch(limit) {
        Acquisition::Remote(series) => Outcome {
            origin: Some(Origin::Remote),
            remote_error: None,
            report: into_report(report(series)),
        },
        Acquisition::Cached { data, cause } => Outcome {
            origin: Some(Origin::Cache),
            remote_error: Some(cause.to_string()),
            report: into_report(report(data)),
        },
        Acquisition::NoData { cause, cache } => Outcome {
            origin: None,
            remote_error: Some(cause.to_string()),
            report: Report::Unavailable(format!("no data available ({})", cache)),
        },
    }
}
