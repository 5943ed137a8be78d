use std::sync::Arc;

use super::{environment::Position, launch_stages::Stage, launch_stages::StageId, structure::Structure};
use crate::errors::SimulationError;
use crate::trajectory_system::kinematics::Flight;

pub const DEFAULT_ROCKET_NAME: &str = "Unknown rocket.";

#[derive(Clone, Debug)]
pub struct Rocket {
    pub name: Arc<str>,
    pub structure: Structure,
    position: Position,
    pub speed: f64,
    /// Drag coefficient times reference area.
    pub drag: f64,
}

impl Rocket {
    pub fn new(name: &str, position: Position) -> Self {
        Rocket {
            name: Arc::from(name),
            structure: Structure::new(),
            position,
            speed: 0.0,
            drag: 0.0,
        }
    }

    pub fn with_drag(mut self, drag: f64) -> Self {
        self.drag = drag;
        self
    }

    pub fn append_stage(&mut self, stage: Stage) -> Result<StageId, SimulationError> {
        self.structure.append_stage(stage)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub(crate) fn position_mut(&mut self) -> &mut Position {
        &mut self.position
    }

    pub fn set_position(&mut self, position: Position) -> Result<(), SimulationError> {
        if self.is_ignited() {
            return Err(SimulationError::AlreadyIgnited);
        }
        self.position = position;
        Ok(())
    }

    pub fn is_ignited(&self) -> bool {
        self.structure.is_ignited()
    }

    pub fn get_stage(&self, name: &str) -> Result<&Stage, SimulationError> {
        self.structure.get_stage(name)
    }

    pub fn get_total_mass(&self) -> f64 {
        self.structure.get_total_mass()
    }

    pub fn weight(&self) -> f64 {
        self.structure.weight(&self.position)
    }

    pub fn thrust(&self) -> f64 {
        self.structure.thrust()
    }

    pub fn isp(&self) -> f64 {
        self.structure.isp(&self.position)
    }

    pub fn thrust_to_weight(&self) -> f64 {
        self.thrust() / self.weight()
    }

    /// Burns one tick of fuel in every ignited stage.
    pub(crate) fn burn(&mut self, dt: f64) -> Result<f64, SimulationError> {
        self.structure.step(dt, &self.position)
    }

    /// Resolves stage links and ignites the bottom stage.
    pub fn ignite(&mut self) -> Result<(), SimulationError> {
        if self.is_ignited() {
            return Err(SimulationError::AlreadyIgnited);
        }
        if self.structure.is_empty() {
            return Err(SimulationError::NoStages);
        }
        self.structure.resolve_links()?;
        self.structure.ignite_next_stage();
        Ok(())
    }

    /// Starts a flight with a fixed tick of `dt` seconds. The returned stream
    /// computes one tick per pulled message.
    pub fn fly(&mut self, dt: f64) -> Result<Flight<'_>, SimulationError> {
        if self.structure.is_empty() {
            return Err(SimulationError::NoStages);
        }
        if !self.is_ignited() {
            self.structure.resolve_links()?;
            self.speed = 0.0;
        }
        Ok(Flight::new(self, dt))
    }
}
