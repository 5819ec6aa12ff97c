//! Integration tests for the command layer and sinks

use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use std::cell::Cell;
use std::fs;
use tempfile::TempDir;
use trv_cli::cli::Args;
use trv_cli::commands::{self, Extreme, LapQuery, Outcome, Report};
use trv_cli::settings::Settings;
use trv_cli::sinks::{JsonLinesSink, Sink, TextSink};
use trv_core::{
    Acquisition, AttributeRecord, CacheMiss, LapRecord, LastN, LuminosityReading, Origin,
    RemoteError, Series, TelemetrySource, TrackLength,
};

struct StubSource<R> {
    acquisition: Acquisition<Series<R>>,
    requested: Cell<Option<u32>>,
}

impl<R> StubSource<R> {
    fn new(acquisition: Acquisition<Series<R>>) -> Self {
        Self {
            acquisition,
            requested: Cell::new(None),
        }
    }
}

impl<R: AttributeRecord + Clone> TelemetrySource for StubSource<R> {
    type Record = R;

    fn name(&self) -> &str {
        "stub"
    }

    fn fetch(&self, limit: LastN) -> Acquisition<Series<R>> {
        self.requested.set(Some(limit.get()));
        self.acquisition.clone()
    }
}

fn start() -> DateTime<Utc> {
    "2024-10-10T18:20:31.123Z".parse().unwrap()
}

fn laps(entries: &[(u32, u64)]) -> Series<LapRecord> {
    entries
        .iter()
        .enumerate()
        .map(|(i, &(lap, ms))| LapRecord::new(lap, ms, start() + Duration::seconds(40 * i as i64)))
        .collect()
}

fn limit() -> LastN {
    LastN::new(5, 10).unwrap()
}

fn track() -> TrackLength {
    TrackLength::new(1200.0).unwrap()
}

fn render_text(outcome: &Outcome) -> String {
    let mut sink = TextSink::new(Vec::new(), -3);
    sink.render(outcome).unwrap();
    String::from_utf8(sink.into_inner()).unwrap()
}

#[test]
fn test_lap_times_from_remote() {
    let source = StubSource::new(Acquisition::Remote(laps(&[
        (1, 40000),
        (2, 41234),
        (3, 39870),
    ])));

    let outcome = commands::run_lap_query(&source, limit(), LapQuery::LapTimes, -3);

    assert_eq!(source.requested.get(), Some(5));
    assert_eq!(outcome.origin, Some(Origin::Remote));
    assert_eq!(outcome.remote_error, None);
    match outcome.report {
        Report::LapTimes(chart) => {
            let labels: Vec<&str> = chart.points.iter().map(|p| p.label.as_str()).collect();
            assert_eq!(labels, vec!["40s 0ms", "41s 234ms", "39s 870ms"]);
            assert!((chart.mean_ms - 40368.0).abs() < 1e-9);
        }
        other => panic!("unexpected report {:?}", other),
    }
}

#[test]
fn test_fastest_from_cache_reports_origin() {
    let source = StubSource::new(Acquisition::Cached {
        data: laps(&[(1, 40000), (2, 41234), (3, 39870)]),
        cause: RemoteError::Timeout,
    });

    let outcome =
        commands::run_lap_query(&source, limit(), LapQuery::Fastest { track: track() }, -3);

    assert_eq!(outcome.origin, Some(Origin::Cache));
    assert!(outcome.remote_error.is_some());
    match &outcome.report {
        Report::Extremes {
            extreme,
            lap,
            speed,
        } => {
            assert_eq!(*extreme, Extreme::Fastest);
            assert_eq!(lap.lap_number, 3);
            let speed = speed.as_ref().unwrap();
            assert_eq!(speed.lap_number, 3);
            assert!((speed.speed.0 - 1200.0 / 39.87).abs() < 1e-9);
        }
        other => panic!("unexpected report {:?}", other),
    }

    let text = render_text(&outcome);
    assert!(text.contains("showing cached data"));
    assert!(text.contains("Fastest lap: lap 3 in 39s 870ms"));
    assert!(text.contains("Highest average speed: lap 3 at 30.10 m/s"));
}

#[test]
fn test_ties_go_to_first_lap() {
    let source = StubSource::new(Acquisition::Remote(laps(&[(4, 40000), (7, 40000)])));

    for query in [
        LapQuery::Fastest { track: track() },
        LapQuery::Slowest { track: track() },
    ] {
        match commands::run_lap_query(&source, limit(), query, -3).report {
            Report::Extremes { lap, speed, .. } => {
                assert_eq!(lap.lap_number, 4);
                assert_eq!(speed.unwrap().lap_number, 4);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }
}

#[test]
fn test_zero_durations_keep_lap_result() {
    let source = StubSource::new(Acquisition::Remote(laps(&[(1, 0), (2, 0)])));

    let outcome =
        commands::run_lap_query(&source, limit(), LapQuery::Slowest { track: track() }, -3);

    match &outcome.report {
        Report::Extremes { lap, speed, .. } => {
            assert_eq!(lap.lap_number, 1);
            assert!(speed.as_ref().unwrap_err().contains("zero duration"));
        }
        other => panic!("unexpected report {:?}", other),
    }
    assert!(render_text(&outcome).contains("Lowest average speed: unable to compute speed"));
}

#[test]
fn test_no_data_is_unavailable() {
    let source: StubSource<LapRecord> = StubSource::new(Acquisition::NoData {
        cause: RemoteError::Status(503),
        cache: CacheMiss::Absent,
    });

    let outcome = commands::run_lap_query(&source, limit(), LapQuery::Schedule, -3);

    assert_eq!(outcome.origin, None);
    assert!(matches!(&outcome.report, Report::Unavailable(msg) if msg.contains("no cached snapshot")));

    let text = render_text(&outcome);
    assert!(text.contains("HTTP status 503"));
    assert!(text.contains("Cannot show results: no data available"));
}

#[test]
fn test_empty_series_is_unavailable() {
    let source = StubSource::new(Acquisition::Remote(laps(&[])));

    for query in [
        LapQuery::Schedule,
        LapQuery::LapTimes,
        LapQuery::Speed { track: track() },
        LapQuery::Fastest { track: track() },
    ] {
        let outcome = commands::run_lap_query(&source, limit(), query, -3);
        assert_eq!(outcome.origin, Some(Origin::Remote));
        assert!(matches!(outcome.report, Report::Unavailable(_)));
    }
}

#[test]
fn test_lap_lookup() {
    let source = StubSource::new(Acquisition::Remote(laps(&[(1, 40000), (2, 60000), (2, 1000)])));

    let found = commands::run_lap_query(
        &source,
        limit(),
        LapQuery::Lap {
            number: 2,
            track: track(),
        },
        -3,
    );
    match &found.report {
        Report::Lap(s) => {
            assert_eq!(s.duration.0, 60000);
            assert!((s.speed.0 - 20.0).abs() < 1e-9);
        }
        other => panic!("unexpected report {:?}", other),
    }
    assert!(render_text(&found).contains("Lap 2: 1m 0s 0ms at 20.00 m/s"));

    let missing = commands::run_lap_query(
        &source,
        limit(),
        LapQuery::Lap {
            number: 9,
            track: track(),
        },
        -3,
    );
    assert_eq!(missing.report, Report::Unavailable("lap 9 not found".to_string()));
}

#[test]
fn test_speed_chart_skips_zero_duration() {
    let source = StubSource::new(Acquisition::Remote(laps(&[(1, 0), (2, 60000), (3, 40000)])));

    let outcome = commands::run_lap_query(&source, limit(), LapQuery::Speed { track: track() }, -3);

    match &outcome.report {
        Report::Speeds(chart) => {
            let laps: Vec<u32> = chart.points.iter().map(|p| p.lap_number).collect();
            assert_eq!(laps, vec![2, 3]);
            assert!((chart.mean.0 - 25.0).abs() < 1e-9);
        }
        other => panic!("unexpected report {:?}", other),
    }
    let text = render_text(&outcome);
    assert!(text.contains("Track length: 1200.00 m"));
    assert!(text.contains("Mean: 25.00 m/s"));
}

#[test]
fn test_schedule_labels_and_curve() {
    let source = StubSource::new(Acquisition::Remote(laps(&[
        (1, 40000),
        (2, 40000),
        (3, 40000),
        (4, 40000),
        (5, 40000),
    ])));

    let outcome = commands::run_lap_query(&source, limit(), LapQuery::Schedule, -3);

    match &outcome.report {
        Report::Schedule(chart) => {
            assert_eq!(chart.points.len(), 5);
            assert_eq!(chart.points[0].label, "15:20:31.123");
            assert_eq!(chart.points[1].label, "15:21:11.123");
            assert!(chart.curve.smoothed);
            assert_eq!(chart.curve.points.len(), 300);
        }
        other => panic!("unexpected report {:?}", other),
    }
    let text = render_text(&outcome);
    assert!(text.contains("Lap arrivals (UTC-03:00)"));
    assert!(text.contains("Smoothed curve: 300 points"));
}

#[test]
fn test_luminosity_listing() {
    let readings: Series<LuminosityReading> = vec![
        LuminosityReading {
            value: 512.0,
            received_at: start(),
        },
        LuminosityReading {
            value: 498.5,
            received_at: start() + Duration::seconds(1),
        },
    ]
    .into();
    let source = StubSource::new(Acquisition::Remote(readings));

    let outcome = commands::run_luminosity(&source, limit());

    assert!(matches!(&outcome.report, Report::Luminosity(series) if series.len() == 2));
    let text = render_text(&outcome);
    assert!(text.contains("15:20:31.123"));
    assert!(text.contains("498.5"));
}

#[test]
fn test_run_rejects_last_n_out_of_range() {
    let args = Args::parse_from(["trackvision", "lap-times", "-n", "11"]);
    assert!(commands::run(&args.command, &Settings::default()).is_err());

    let args = Args::parse_from(["trackvision", "lap-times", "-n", "0"]);
    assert!(commands::run(&args.command, &Settings::default()).is_err());
}

#[test]
fn test_run_reports_invalid_track_length_before_fetching() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.source.cache_dir = temp_dir.path().to_path_buf();

    let args = Args::parse_from(["trackvision", "speed", "--track-length", "-5"]);
    let outcome = commands::run(&args.command, &settings).unwrap();

    assert_eq!(outcome.origin, None);
    assert_eq!(outcome.remote_error, None);
    assert!(matches!(&outcome.report, Report::Unavailable(msg) if msg.contains("invalid track length")));
    assert!(fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[test]
fn test_json_lines_sink_appends() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("charts.ndjson");
    let source = StubSource::new(Acquisition::Remote(laps(&[(1, 40000), (2, 41234)])));

    for query in [LapQuery::LapTimes, LapQuery::Speed { track: track() }] {
        let outcome = commands::run_lap_query(&source, limit(), query, -3);
        let mut sink = JsonLinesSink::new(&path).unwrap();
        sink.render(&outcome).unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["origin"], "remote");
    assert_eq!(lines[0]["report"]["kind"], "lap_times");
    assert_eq!(lines[0]["report"]["data"]["points"][1]["label"], "41s 234ms");
    assert_eq!(lines[1]["report"]["kind"], "speeds");
    assert_eq!(lines[1]["report"]["data"]["track_length"], 1200.0);
}
