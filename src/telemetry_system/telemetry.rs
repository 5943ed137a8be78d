use std::fmt;

use serde::Serialize;

use crate::telemetry_system::messages::{FlightLog, StageSeparation};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightReport {
    pub mass_delta: f64,
    pub start_time: f64,
    pub time: f64,
    pub max_alt: f64,
    pub min_tw: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparationReport {
    pub time: f64,
    pub stage_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "telemetryType")]
pub enum Report {
    #[serde(rename = "FlightTelemetry")]
    Flight(FlightReport),
    #[serde(rename = "StageSeparation")]
    Separation(SeparationReport),
}

impl Report {
    pub fn time(&self) -> f64 {
        match self {
            Report::Flight(report) => report.time,
            Report::Separation(report) => report.time,
        }
    }

    pub fn telemetry_type(&self) -> &'static str {
        match self {
            Report::Flight(_) => "FlightTelemetry",
            Report::Separation(_) => "StageSeparation",
        }
    }
}

impl From<&StageSeparation> for SeparationReport {
    fn from(separation: &StageSeparation) -> Self {
        SeparationReport {
            time: separation.abs_time,
            stage_name: separation.stage.name().to_string(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Flight(report) => {
                write!(
                    f,
                    "telemetryType=FlightTelemetry time={:.2}s startTime={:.2}s massDelta={:.2}kg maxAlt={:.2}m",
                    report.time, report.start_time, report.mass_delta, report.max_alt
                )?;
                match report.min_tw {
                    Some(min_tw) => write!(f, " minTw={:.3}", min_tw),
                    None => write!(f, " minTw=-"),
                }
            }
            Report::Separation(report) => write!(
                f,
                "telemetryType=StageSeparation time={:.2}s stageName={}",
                report.time, report.stage_name
            ),
        }
    }
}

/// Reduces the flight logs of one reporting window.
#[derive(Clone, Debug, Default)]
pub struct FlightTelemetry {
    samples: usize,
    mass_delta: f64,
    start_time: Option<f64>,
    time: f64,
    max_alt: f64,
    min_tw: Option<f64>,
}

impl FlightTelemetry {
    pub fn new() -> Self {
        FlightTelemetry::default()
    }

    pub fn accumulate(&mut self, log: &FlightLog) {
        self.samples += 1;
        self.mass_delta += log.consumed_kg;
        self.start_time.get_or_insert(log.abs_time);
        self.time = self.time.max(log.abs_time);
        self.max_alt = self.max_alt.max(log.surface_altitude());

        let tw = log.thrust_to_weight();
        self.min_tw = Some(self.min_tw.map_or(tw, |old| old.min(tw)));
    }

    pub fn has_data(&self) -> bool {
        self.samples > 0
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn get_report(&self) -> FlightReport {
        FlightReport {
            mass_delta: self.mass_delta,
            start_time: self.start_time.unwrap_or_default(),
            time: self.time,
            max_alt: self.max_alt,
            min_tw: self.min_tw,
        }
    }
}
