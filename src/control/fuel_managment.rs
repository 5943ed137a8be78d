use std::sync::Arc;

use crate::constants::{EMPTY_TANK_TOLERANCE, FUEL_DENSITY};

#[derive(Clone, Debug, PartialEq)]
pub struct FuelTank {
    pub name: Arc<str>,
    pub mass_empty: f64, // kg
    pub mass_full: f64,  // kg
    capacity: f64,       // L
    fuel: f64,           // L
}

impl FuelTank {
    pub fn new(name: &str, mass_empty: f64, mass_full: f64, capacity: f64) -> Self {
        FuelTank {
            name: Arc::from(name),
            mass_empty,
            mass_full,
            capacity,
            fuel: capacity,
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Residual fuel in litres.
    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn fuel_mass(&self) -> f64 {
        self.fuel * FUEL_DENSITY
    }

    pub fn get_mass(&self) -> f64 {
        self.mass_empty + self.fuel_mass()
    }

    pub fn is_empty(&self) -> bool {
        self.fuel < EMPTY_TANK_TOLERANCE
    }

    /// Draws up to `max_kg` of fuel. Returns the kilograms that could not be
    /// drawn because the tank ran dry.
    pub fn consume(&mut self, max_kg: f64) -> f64 {
        if max_kg <= 0.0 {
            return 0.0;
        }
        let available = self.fuel_mass();
        if max_kg >= available {
            self.fuel = 0.0;
            max_kg - available
        } else {
            self.fuel = (self.fuel - max_kg / FUEL_DENSITY).max(0.0);
            0.0
        }
    }
}
