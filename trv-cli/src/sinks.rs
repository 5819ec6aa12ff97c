//! Output sink implementations
//!
//! Sinks render a command [`Outcome`] to a terminal table or an NDJSON file
//! for an external plotting tool.

use crate::commands::{Extreme, Outcome, Report};
use anyhow::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use trv_core::analytics::format_duration;
use trv_core::chart::{time_of_day_label, LapTimeChart, ScheduleChart, SpeedChart};
use trv_core::{LuminositySeries, Origin};

/// Trait for output sinks
pub trait Sink {
    fn render(&mut self, outcome: &Outcome) -> Result<()>;
}

/// Human-readable tables
pub struct TextSink<W: Write> {
    out: W,
    utc_offset_hours: i32,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, utc_offset_hours: i32) -> Self {
        Self {
            out,
            utc_offset_hours,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn schedule(&mut self, chart: &ScheduleChart) -> Result<()> {
        writeln!(
            self.out,
            "Lap arrivals (UTC{:+03}:00)",
            chart.utc_offset_hours
        )?;
        writeln!(self.out, "{:>4}  {}", "#", "Received")?;
        for point in &chart.points {
            writeln!(self.out, "{:>4}  {}", point.index, point.label)?;
        }
        if chart.curve.smoothed {
            writeln!(self.out, "Smoothed curve: {} points", chart.curve.points.len())?;
        } else {
            writeln!(self.out, "Too few laps to smooth, curve follows the raw points")?;
        }
        Ok(())
    }

    fn lap_times(&mut self, chart: &LapTimeChart) -> Result<()> {
        writeln!(self.out, "{:>4}  {}", "Lap", "Time")?;
        for point in &chart.points {
            writeln!(self.out, "{:>4}  {}", point.lap_number, point.label)?;
        }
        writeln!(
            self.out,
            "Mean: {}",
            format_duration(chart.mean_ms.round() as u64)
        )?;
        Ok(())
    }

    fn speeds(&mut self, chart: &SpeedChart) -> Result<()> {
        writeln!(self.out, "Track length: {:.2} m", chart.track_length.0)?;
        writeln!(self.out, "{:>4}  {}", "Lap", "Average speed")?;
        for point in &chart.points {
            writeln!(self.out, "{:>4}  {}", point.lap_number, point.label)?;
        }
        writeln!(self.out, "Mean: {}", chart.mean)?;
        Ok(())
    }

    fn luminosity(&mut self, series: &LuminositySeries) -> Result<()> {
        if series.is_empty() {
            writeln!(self.out, "No luminosity readings")?;
            return Ok(());
        }
        writeln!(self.out, "{:>4}  {:<12}  {}", "#", "Received", "Luminosity")?;
        for (i, reading) in series.iter().enumerate() {
            writeln!(
                self.out,
                "{:>4}  {:<12}  {}",
                i + 1,
                time_of_day_label(reading.received_at, self.utc_offset_hours),
                reading.value
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn render(&mut self, outcome: &Outcome) -> Result<()> {
        match (outcome.origin, &outcome.remote_error) {
            (Some(Origin::Cache), Some(cause)) => writeln!(
                self.out,
                "Remote telemetry unavailable ({}), showing cached data",
                cause
            )?,
            (None, Some(cause)) => {
                writeln!(self.out, "Remote telemetry unavailable ({})", cause)?
            }
            _ => {}
        }

        match &outcome.report {
            Report::Schedule(chart) => self.schedule(chart)?,
            Report::LapTimes(chart) => self.lap_times(chart)?,
            Report::Speeds(chart) => self.speeds(chart)?,
            Report::Extremes {
                extreme,
                lap,
                speed,
            } => {
                let (which, speed_label) = match extreme {
                    Extreme::Fastest => ("Fastest", "Highest"),
                    Extreme::Slowest => ("Slowest", "Lowest"),
                };
                writeln!(
                    self.out,
                    "{} lap: lap {} in {}",
                    which, lap.lap_number, lap.duration
                )?;
                match speed {
                    Ok(s) => writeln!(
                        self.out,
                        "{} average speed: lap {} at {}",
                        speed_label, s.lap_number, s.speed
                    )?,
                    Err(reason) => writeln!(self.out, "{} average speed: {}", speed_label, reason)?,
                }
            }
            Report::Lap(s) => writeln!(
                self.out,
                "Lap {}: {} at {}",
                s.lap_number, s.duration, s.speed
            )?,
            Report::Luminosity(series) => self.luminosity(series)?,
            Report::Unavailable(reason) => writeln!(self.out, "Cannot show results: {}", reason)?,
        }

        self.out.flush()?;
        Ok(())
    }
}

/// File sink (NDJSON), one outcome per line
pub struct JsonLinesSink {
    file: File,
}

impl JsonLinesSink {
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl Sink for JsonLinesSink {
    fn render(&mut self, outcome: &Outcome) -> Result<()> {
        let json = serde_json::to_string(outcome)?;
        writeln!(self.file, "{}", json)?;
        Ok(())
    }
}
