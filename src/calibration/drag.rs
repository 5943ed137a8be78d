use tracing::{debug, info};

use crate::constants::{
    DRAG_EPSILON, DRAG_INITIAL_UPPER_BOUND, DRAG_MAX_ITERATIONS, DRAG_OBSERVATION_HALF_WINDOW,
    DRAG_REPORT_FREQUENCY, DEFAULT_TIME_STEP,
};
use crate::control::rocket::Rocket;
use crate::errors::SolverError;
use crate::telemetry_system::telemetry::Report;
use crate::telemetry_system::tracker::{ReportWindow, Tracker};
use crate::utils::stats::mean;

/// Bisection search for the drag coefficient that puts a rocket at a measured
/// altitude at a measured time.
#[derive(Clone, Debug)]
pub struct DragSolver {
    pub target_altitude: f64,
    pub target_time: f64,
    pub epsilon: f64,
    pub initial_max: f64,
    pub report_freq: f64,
    pub dt: f64,
    pub max_iterations: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragEstimate {
    pub drag: f64,
    /// `[min, max]` after every trial, in search order.
    pub brackets: Vec<(f64, f64)>,
    pub iterations: usize,
}

impl DragSolver {
    pub fn new(target_altitude: f64, target_time: f64) -> Self {
        DragSolver {
            target_altitude,
            target_time,
            epsilon: DRAG_EPSILON,
            initial_max: DRAG_INITIAL_UPPER_BOUND,
            report_freq: DRAG_REPORT_FREQUENCY,
            dt: DEFAULT_TIME_STEP,
            max_iterations: DRAG_MAX_ITERATIONS,
        }
    }

    pub fn observation_window(&self) -> ReportWindow {
        ReportWindow::around(self.target_time, DRAG_OBSERVATION_HALF_WINDOW)
    }

    /// Flies a copy of `rocket` with the given drag and returns the mean
    /// max altitude reported inside the observation window. The original
    /// rocket is left untouched.
    pub fn observe(&self, rocket: &Rocket, drag: f64) -> Result<f64, SolverError> {
        let mut trial = rocket.clone().with_drag(drag);
        let flight = trial.fly(self.dt)?;
        let tracker = Tracker::new(flight, self.report_freq).with_windows(vec![self.observation_window()]);

        let mut altitudes = Vec::new();
        for report in tracker {
            if let Report::Flight(report) = report? {
                altitudes.push(report.max_alt);
            }
        }
        if altitudes.is_empty() {
            return Err(SolverError::NoSamples { drag });
        }

        let altitude = mean(altitudes.iter().copied());
        debug!(drag, altitude, samples = altitudes.len(), "observed trial flight");
        Ok(altitude)
    }

    /// Searches `[0, initial_max]`, doubling the upper bound until a trial
    /// falls short of the target altitude, then bisects until the bracket is
    /// narrower than `epsilon`.
    pub fn solve(&self, rocket: &Rocket) -> Result<DragEstimate, SolverError> {
        self.solve_with(rocket, |_, _| {})
    }

    /// Like [`DragSolver::solve`], calling `on_bracket(min, max)` after every
    /// trial.
    pub fn solve_with<F>(&self, rocket: &Rocket, mut on_bracket: F) -> Result<DragEstimate, SolverError>
    where
        F: FnMut(f64, f64),
    {
        let mut min = 0.0;
        let mut max = self.initial_max;
        let mut confirmed = false;
        let mut brackets = Vec::new();
        let mut iterations = 0;

        loop {
            if max - min <= self.epsilon {
                return Ok(DragEstimate {
                    drag: (min + max) / 2.0,
                    brackets,
                    iterations,
                });
            }
            if iterations >= self.max_iterations {
                return Err(SolverError::NotConverged {
                    iterations,
                    min,
                    max,
                });
            }

            let mid = (min + max) / 2.0;
            let altitude = self.observe(rocket, mid)?;
            iterations += 1;

            if altitude > self.target_altitude {
                min = mid;
                if !confirmed {
                    max *= 2.0;
                }
            } else if altitude < self.target_altitude {
                max = mid;
                confirmed = true;
            } else {
                min = mid;
                max = mid;
            }

            info!(min, max, altitude, target = self.target_altitude, "drag bracket");
            brackets.push((min, max));
            on_bracket(min, max);
        }
    }
}
