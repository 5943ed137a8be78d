use std::sync::Arc;

use crate::constants::FUEL_DENSITY;
use crate::control::environment::Position;

/// Fuel flow of an engine, in litres per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConsumptionRate {
    Constant(f64),
    /// Interpolates between vacuum and sea level by local pressure (atm).
    PressureDependent { atmosphere: f64, vacuum: f64 },
}

impl ConsumptionRate {
    pub fn litres_per_second(&self, pressure: f64) -> f64 {
        match *self {
            ConsumptionRate::Constant(rate) => rate,
            ConsumptionRate::PressureDependent { atmosphere, vacuum } => {
                vacuum + (atmosphere - vacuum) * pressure.clamp(0.0, 1.0)
            }
        }
    }
}

/// Liquid fuel engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Engine {
    pub name: Arc<str>,
    pub mass: f64,   // kg
    pub thrust: f64, // N
    pub consumption: ConsumptionRate,
}

impl Engine {
    pub fn new(name: &str, mass: f64, thrust: f64, consumption: ConsumptionRate) -> Self {
        Engine {
            name: Arc::from(name),
            mass,
            thrust,
            consumption,
        }
    }

    pub fn consumption_litres(&self, position: &Position) -> f64 {
        self.consumption.litres_per_second(position.pressure())
    }

    /// Fuel burned per second at full thrust, in kg.
    pub fn consumption_kg(&self, position: &Position) -> f64 {
        self.consumption_litres(position) * FUEL_DENSITY
    }

    pub fn isp(&self, position: &Position) -> f64 {
        self.thrust / (self.consumption_kg(position) * position.g())
    }

    pub fn weight(&self, position: &Position) -> f64 {
        self.mass * position.g()
    }
}
