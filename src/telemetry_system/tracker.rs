use std::collections::VecDeque;

use crate::errors::SimulationError;
use crate::telemetry_system::messages::Message;
use crate::telemetry_system::telemetry::{FlightTelemetry, Report, SeparationReport};
use crate::trajectory_system::kinematics::Flight;

/// An inclusive `[start, end]` range of absolute flight time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportWindow {
    pub start: f64,
    pub end: f64,
}

impl ReportWindow {
    pub fn new(start: f64, end: f64) -> Self {
        ReportWindow { start, end }
    }

    pub fn around(center: f64, half_width: f64) -> Self {
        ReportWindow::new(center - half_width, center + half_width)
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Turns a flight into periodic telemetry reports.
///
/// Separation reports are emitted as soon as the stage leaves. Flight logs
/// are reduced into windows `report_freq` seconds apart; the partial window
/// left when the flight ends is flushed as a last report. With report windows
/// set, only reports timed inside one of them are surfaced, and the flight is
/// not pulled any further once its time passes the last window.
#[derive(Debug)]
pub struct Tracker<'a> {
    flight: Flight<'a>,
    report_freq: f64,
    windows: Option<Vec<ReportWindow>>,
    telemetry: FlightTelemetry,
    next_report_at: f64,
    last_time: f64,
    pending: VecDeque<Report>,
    finished: bool,
}

impl<'a> Tracker<'a> {
    pub fn new(flight: Flight<'a>, report_freq: f64) -> Self {
        Tracker {
            flight,
            report_freq,
            windows: None,
            telemetry: FlightTelemetry::new(),
            next_report_at: report_freq,
            last_time: 0.0,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    pub fn with_windows(mut self, windows: Vec<ReportWindow>) -> Self {
        self.windows = Some(windows);
        self
    }

    pub fn flight(&self) -> &Flight<'a> {
        &self.flight
    }

    fn in_windows(&self, time: f64) -> bool {
        match &self.windows {
            Some(windows) => windows.iter().any(|window| window.contains(time)),
            None => true,
        }
    }

    fn past_windows(&self) -> bool {
        match &self.windows {
            Some(windows) => windows
                .iter()
                .map(|window| window.end)
                .fold(f64::NEG_INFINITY, f64::max)
                < self.last_time,
            None => false,
        }
    }

    fn emit(&mut self, report: Report) {
        if self.in_windows(report.time()) {
            self.pending.push_back(report);
        }
    }

    fn flush(&mut self) {
        if self.telemetry.has_data() {
            let report = self.telemetry.get_report();
            self.telemetry = FlightTelemetry::new();
            self.emit(Report::Flight(report));
        }
    }

    fn handle(&mut self, message: Message) {
        self.last_time = message.abs_time();
        match message {
            Message::StageSeparation(separation) => {
                self.emit(Report::Separation(SeparationReport::from(&separation)));
            }
            Message::FlightLog(log) => {
                self.telemetry.accumulate(&log);
                if self.next_report_at <= log.abs_time {
                    let report = self.telemetry.get_report();
                    self.telemetry = FlightTelemetry::new();
                    self.next_report_at = log.abs_time + self.report_freq;
                    self.emit(Report::Flight(report));
                }
            }
        }
    }
}

impl Iterator for Tracker<'_> {
    type Item = Result<Report, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(report) = self.pending.pop_front() {
                return Some(Ok(report));
            }
            if self.finished {
                return None;
            }
            if self.past_windows() {
                self.finished = true;
                self.flush();
                continue;
            }
            match self.flight.next() {
                Some(Ok(message)) => self.handle(message),
                Some(Err(error)) => {
                    self.finished = true;
                    return Some(Err(error));
                }
                None => {
                    self.finished = true;
                    self.flush();
                }
            }
        }
    }
}
