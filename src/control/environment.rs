use std::sync::Arc;

use crate::constants::SURFACE_TOLERANCE;
use crate::control::celestial::CelestialBody;

/// A point above a body. `altitude` is measured from the body centre.
#[derive(Clone, Debug)]
pub struct Position {
    body: Arc<CelestialBody>,
    altitude: f64,
}

impl Position {
    pub fn new(body: Arc<CelestialBody>, altitude: f64) -> Self {
        Position { body, altitude }
    }

    /// Position resting on the surface of `body`.
    pub fn on_surface(body: Arc<CelestialBody>) -> Self {
        let altitude = body.radius;
        Position::new(body, altitude)
    }

    pub fn body(&self) -> &CelestialBody {
        &self.body
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn surface_altitude(&self) -> f64 {
        self.altitude - self.body.radius
    }

    pub fn g(&self) -> f64 {
        self.body.gravity_at(self.altitude)
    }

    pub fn pressure(&self) -> f64 {
        self.body.pressure_at(self.altitude)
    }

    pub fn density(&self) -> f64 {
        self.body.density_at(self.pressure())
    }

    pub fn standing_on_surface(&self) -> bool {
        (self.altitude - self.body.radius).abs() < SURFACE_TOLERANCE
    }

    pub fn change_altitude(&mut self, delta: f64) {
        self.altitude += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::celestial::Atmosphere;
    use approx::assert_abs_diff_eq;

    fn create_kerbin() -> Arc<CelestialBody> {
        Arc::new(
            CelestialBody::with_surface_gravity("Kerbin", 600_000.0, 9.81)
                .with_atmosphere(Atmosphere::kerbin()),
        )
    }

    #[test]
    fn test_conditions_at_surface() {
        let position = Position::on_surface(create_kerbin());

        assert!(position.standing_on_surface());
        assert_abs_diff_eq!(position.g(), 9.81, epsilon = 1e-9);
        assert_abs_diff_eq!(position.pressure(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(position.density(), 1.2230948554874, epsilon = 1e-9);
        assert_abs_diff_eq!(position.surface_altitude(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_change_altitude() {
        let mut position = Position::on_surface(create_kerbin());

        position.change_altitude(0.005);
        assert!(position.standing_on_surface(), "5 mm is still resting");

        position.change_altitude(10_000.0);
        assert!(!position.standing_on_surface());
        assert_abs_diff_eq!(position.surface_altitude(), 10_000.005, epsilon = 1e-6);
        assert!(position.g() < 9.81);
        assert!(position.pressure() < 1.0);
    }

    #[test]
    fn test_gravity_variation_with_altitude() {
        let body = create_kerbin();
        let radius = body.radius;
        let mut position = Position::on_surface(body);
        let gravity_surface = position.g();

        position.change_altitude(100_000.0);
        let expected_ratio = (radius / (radius + 100_000.0)).powi(2);
        assert_abs_diff_eq!(position.g() / gravity_surface, expected_ratio, epsilon = 1e-12);
    }

    #[test]
    fn test_space_conditions() {
        let mut position = Position::on_surface(create_kerbin());
        position.change_altitude(500_000.0);

        assert_eq!(position.pressure(), 0.0);
        assert_eq!(position.density(), 0.0);
    }
}
