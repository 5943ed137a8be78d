use std::collections::VecDeque;

use tracing::trace;

use crate::control::launch_stages::StageState;
use crate::control::rocket::Rocket;
use crate::errors::SimulationError;
use crate::telemetry_system::messages::{FlightLog, Message, StageSeparation, TickSample};

/// Pull-based flight stream. Each call to `next` computes at most one physics
/// tick; dropping the stream leaves the rest of the flight uncomputed.
#[derive(Debug)]
pub struct Flight<'a> {
    rocket: &'a mut Rocket,
    dt: f64,
    abs_time: f64,
    pending: VecDeque<Message>,
    finished: bool,
}

impl<'a> Flight<'a> {
    pub(crate) fn new(rocket: &'a mut Rocket, dt: f64) -> Self {
        Flight {
            rocket,
            dt,
            abs_time: 0.0,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn abs_time(&self) -> f64 {
        self.abs_time
    }

    pub fn rocket(&self) -> &Rocket {
        self.rocket
    }

    fn separate(&mut self, index: usize) -> Result<(), SimulationError> {
        let stages = self.rocket.structure.separate_stage(index)?;
        for stage in stages {
            self.pending.push_back(Message::StageSeparation(StageSeparation::new(
                self.dt,
                self.rocket.name.clone(),
                self.abs_time,
                stage,
            )));
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<(), SimulationError> {
        let queued = self.pending.len();

        // Spent ignited stages go first, taking everything below them.
        for id in self.rocket.structure.ignited_ids() {
            if let Some(index) = self.rocket.structure.index_of(id) {
                if self.rocket.structure.stage_state(index) == StageState::Empty {
                    self.separate(index)?;
                }
            }
        }

        let ignition = !self.rocket.structure.is_ignited() && !self.rocket.structure.is_empty();
        if ignition {
            self.rocket.structure.ignite_next_stage();
        }

        // Bottom stages that never had fuel to burn.
        while let Some(bottom) = self.rocket.structure.len().checked_sub(1) {
            if !self.rocket.structure.stage_is_empty(bottom) {
                break;
            }
            self.separate(bottom)?;
        }

        let consumed = self.rocket.burn(self.dt)?;

        if consumed > 0.0 {
            let message = self.integrate(consumed);
            trace!(fields = ?message.fields(), "flight tick");
            self.pending.push_back(Message::FlightLog(message));
        } else if !ignition
            && self.pending.len() == queued
            && !self.rocket.structure.is_empty()
        {
            return Err(SimulationError::Stalled {
                time: self.abs_time,
            });
        }

        self.abs_time += self.dt;
        Ok(())
    }

    fn integrate(&mut self, consumed: f64) -> FlightLog {
        let rocket = &mut *self.rocket;
        let position = rocket.position();
        let end_mass = rocket.structure.get_total_mass();
        let g = position.g();
        let sample = TickSample {
            isp: rocket.structure.isp(position),
            g,
            end_mass,
            thrust: rocket.structure.thrust(),
            weight: end_mass * g,
            speed: rocket.speed,
            drag_coefficient: rocket.drag,
            air_density: position.density(),
        };
        let mut message = FlightLog::new(self.dt, rocket.name.clone(), self.abs_time, consumed, sample);

        let mut dv = message.effective_dv();
        if position.standing_on_surface() {
            // Thrust below weight must not push the rocket into the ground.
            dv = dv.max(0.0);
            rocket.speed = rocket.speed.max(0.0);
        }
        rocket.speed += dv;
        let climb = rocket.speed * self.dt;
        rocket.position_mut().change_altitude(climb);

        message.record_motion(rocket.speed, rocket.position().surface_altitude());
        message
    }
}

impl Iterator for Flight<'_> {
    type Item = Result<Message, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Some(Ok(message));
            }
            if self.finished || self.rocket.structure.is_empty() {
                self.finished = true;
                return None;
            }
            if let Err(error) = self.tick() {
                self.finished = true;
                self.pending.clear();
                return Some(Err(error));
            }
        }
    }
}
