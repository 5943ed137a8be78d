use std::sync::Arc;

use crate::constants::{
    DEFAULT_START_POSITION, GRAVITATIONAL_CONSTANT, KERBIN_ATMOSPHERE_CEILING,
    KERBIN_DENSITY_PER_ATM, KERBIN_SCALE_HEIGHT,
};
use crate::control::environment::Position;
use crate::errors::ConfigError;

/// Exponential atmosphere. Pressures are in atmospheres.
#[derive(Clone, Debug, PartialEq)]
pub struct Atmosphere {
    pub surface_pressure: f64,
    pub scale_height: f64,     // m
    pub ceiling: f64,          // m above ground
    pub density_per_atm: f64,  // kg/m³
}

impl Atmosphere {
    pub fn new(surface_pressure: f64, scale_height: f64, ceiling: f64, density_per_atm: f64) -> Self {
        Atmosphere {
            surface_pressure,
            scale_height,
            ceiling,
            density_per_atm,
        }
    }

    pub fn kerbin() -> Self {
        Atmosphere::new(
            1.0,
            KERBIN_SCALE_HEIGHT,
            KERBIN_ATMOSPHERE_CEILING,
            KERBIN_DENSITY_PER_ATM,
        )
    }

    pub fn pressure_above_ground(&self, height: f64) -> f64 {
        if height >= self.ceiling {
            return 0.0;
        }
        // Below the surface we hold the surface value.
        self.surface_pressure * (-height.max(0.0) / self.scale_height).exp()
    }

    pub fn density(&self, pressure: f64) -> f64 {
        self.density_per_atm * pressure
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Orbit {
    pub parent: Arc<str>,
    pub apoapsis: f64,  // m
    pub periapsis: f64, // m
    pub period: f64,    // s
}

impl Orbit {
    pub fn new(parent: &str, apoapsis: f64, periapsis: f64, period: f64) -> Self {
        Orbit {
            parent: Arc::from(parent),
            apoapsis,
            periapsis,
            period,
        }
    }

    pub fn semi_major_axis(&self) -> f64 {
        (self.apoapsis + self.periapsis) / 2.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    pub name: Arc<str>,
    pub radius: f64, // m
    pub mass: f64,   // kg
    pub atmosphere: Option<Atmosphere>,
    pub orbit: Option<Orbit>,
}

impl CelestialBody {
    pub fn new(name: &str, radius: f64, mass: f64) -> Self {
        CelestialBody {
            name: Arc::from(name),
            radius,
            mass,
            atmosphere: None,
            orbit: None,
        }
    }

    /// Builds a body whose mass yields the requested gravity at its surface.
    pub fn with_surface_gravity(name: &str, radius: f64, surface_gravity: f64) -> Self {
        let mass = surface_gravity * radius.powi(2) / GRAVITATIONAL_CONSTANT;
        CelestialBody::new(name, radius, mass)
    }

    pub fn with_atmosphere(mut self, atmosphere: Atmosphere) -> Self {
        self.atmosphere = Some(atmosphere);
        self
    }

    pub fn on_orbit(mut self, orbit: Orbit) -> Self {
        self.orbit = Some(orbit);
        self
    }

    pub fn has_atmosphere(&self) -> bool {
        self.atmosphere.is_some()
    }

    /// Gravity at `distance` metres from the body centre.
    pub fn gravity_at(&self, distance: f64) -> f64 {
        GRAVITATIONAL_CONSTANT * self.mass / distance.powi(2)
    }

    pub fn surface_gravity(&self) -> f64 {
        self.gravity_at(self.radius)
    }

    pub fn escape_velocity(&self) -> f64 {
        (2.0 * GRAVITATIONAL_CONSTANT * self.mass / self.radius).sqrt()
    }

    /// Pressure (atm) at `distance` metres from the body centre.
    pub fn pressure_at(&self, distance: f64) -> f64 {
        match &self.atmosphere {
            Some(atmosphere) => atmosphere.pressure_above_ground(distance - self.radius),
            None => 0.0,
        }
    }

    pub fn density_at(&self, pressure: f64) -> f64 {
        match &self.atmosphere {
            Some(atmosphere) => atmosphere.density(pressure),
            None => 0.0,
        }
    }

    pub fn semi_major_axis(&self) -> Option<f64> {
        self.orbit.as_ref().map(Orbit::semi_major_axis)
    }
}

/// Read-only registry of the bodies a flight may start from.
#[derive(Clone, Debug, Default)]
pub struct BodyCatalog {
    bodies: Vec<Arc<CelestialBody>>,
}

impl BodyCatalog {
    pub fn new(bodies: Vec<CelestialBody>) -> Self {
        BodyCatalog {
            bodies: bodies.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn kerbol_system() -> Self {
        let kerbol = CelestialBody::new("Kerbol", 261_600_000.0, 1.756567e28);
        let kerbin = CelestialBody::new("Kerbin", 600_000.0, 5.2915793e22)
            .with_atmosphere(Atmosphere::kerbin())
            .on_orbit(Orbit::new(
                "Kerbol",
                13_599_840_256.0,
                13_599_840_256.0,
                9_203_544.6,
            ));
        let mun = CelestialBody::new("Mun", 200_000.0, 9.7600236e20).on_orbit(Orbit::new(
            "Kerbin",
            12_000_000.0,
            12_000_000.0,
            138_984.38,
        ));

        BodyCatalog::new(vec![kerbol, kerbin, mun])
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Arc<CelestialBody>> {
        self.bodies.iter()
    }

    pub fn find_one(&self, name: &str) -> Result<Arc<CelestialBody>, ConfigError> {
        let mut found = self.bodies.iter().filter(|body| &*body.name == name);
        match (found.next(), found.next()) {
            (Some(body), None) => Ok(Arc::clone(body)),
            (Some(_), Some(_)) => Err(ConfigError::DuplicateBody(name.to_string())),
            (None, _) => Err(ConfigError::UnknownBody(name.to_string())),
        }
    }

    pub fn sphere_of_influence(&self, name: &str) -> Result<Option<f64>, ConfigError> {
        let body = self.find_one(name)?;
        let Some(orbit) = &body.orbit else {
            return Ok(None);
        };
        let parent = self.find_one(&orbit.parent)?;
        Ok(Some(
            orbit.semi_major_axis() * (body.mass / parent.mass).powf(2.0 / 5.0),
        ))
    }

    /// Parses `planet=<Name>:alt=<metres above surface>` into a position.
    pub fn parse_position(&self, text: &str) -> Result<Position, ConfigError> {
        let mut planet = None;
        let mut altitude = None;
        for part in text.split(':') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidPosition(text.to_string()))?;
            match key.trim() {
                "planet" => planet = Some(value.trim()),
                "alt" => {
                    let parsed = value
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| ConfigError::InvalidPosition(text.to_string()))?;
                    altitude = Some(parsed);
                }
                _ => return Err(ConfigError::InvalidPosition(text.to_string())),
            }
        }

        match (planet, altitude) {
            (Some(planet), Some(altitude)) => {
                let body = self.find_one(planet)?;
                let distance = body.radius + altitude;
                Ok(Position::new(body, distance))
            }
            _ => Err(ConfigError::InvalidPosition(text.to_string())),
        }
    }

    pub fn default_position(&self) -> Result<Position, ConfigError> {
        self.parse_position(DEFAULT_START_POSITION)
    }
}
