// Physical Constants
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11; // N⋅m²/kg²
pub const FUEL_DENSITY: f64 = 5.0; // kg/L (liquid fuel)

// Kerbin atmosphere
pub const KERBIN_SCALE_HEIGHT: f64 = 5_000.0; // m
pub const KERBIN_ATMOSPHERE_CEILING: f64 = 70_000.0; // m
pub const KERBIN_DENSITY_PER_ATM: f64 = 1.2230948554874; // kg/m³ at 1 atm

// Tolerances
pub const SURFACE_TOLERANCE: f64 = 1e-2; // m
pub const EMPTY_TANK_TOLERANCE: f64 = 1e-6; // L
pub const MASS_CONSERVATION_TOLERANCE: f64 = 1e-6; // kg

// Simulation Parameters
pub const DEFAULT_TIME_STEP: f64 = 0.01; // s
pub const DEFAULT_REPORT_FREQUENCY: f64 = 10.0; // s
pub const DEFAULT_START_POSITION: &str = "planet=Kerbin:alt=68.41";

// Drag calibration
pub const DRAG_EPSILON: f64 = 0.005;
pub const DRAG_INITIAL_UPPER_BOUND: f64 = 100.0;
pub const DRAG_REPORT_FREQUENCY: f64 = 0.2; // s
pub const DRAG_OBSERVATION_HALF_WINDOW: f64 = 0.5; // s
pub const DRAG_MAX_ITERATIONS: usize = 200;
