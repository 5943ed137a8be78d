pub mod calibration;
pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use constants::*;
pub use control::celestial::{Atmosphere, BodyCatalog, CelestialBody};
pub use control::design::{RocketDesign, StageDesign};
pub use control::environment::Position;
pub use control::launch_stages::{Stage, StageId};
pub use control::parts::{Part, PartCatalog};
pub use control::rocket::Rocket;
pub use control::structure::Structure;

// Re-export commonly used items from trajectory_system
pub use trajectory_system::kinematics::Flight;

// Re-export commonly used items from telemetry_system
pub use telemetry_system::messages::{FlightLog, Message, StageSeparation};
pub use telemetry_system::telemetry::{FlightReport, FlightTelemetry, Report, SeparationReport};
pub use telemetry_system::tracker::{ReportWindow, Tracker};

// Re-export the calibration entry points
pub use calibration::drag::{DragEstimate, DragSolver};
