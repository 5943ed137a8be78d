pub fn dynamic_pressure(air_density: f64, speed: f64) -> f64 {
    0.5 * air_density * speed.powi(2)
}

/// Drag force in Newtons. `drag_coefficient` already includes the reference
/// area.
pub fn drag_force(air_density: f64, speed: f64, drag_coefficient: f64) -> f64 {
    dynamic_pressure(air_density, speed) * drag_coefficient
}
