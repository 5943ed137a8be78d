use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Rocket has been already ignited and simulation is running")]
    AlreadyIgnited,

    #[error("Stage {0:?} not found")]
    StageNotFound(String),

    #[error("More than one stage named {0:?} present")]
    DuplicateStage(String),

    #[error("Stage {0:?} takes fuel from other stages but does not list \"self\"")]
    MissingSelfFuelSource(String),

    #[error("Ignition cycle detected: {}", .0.join(" -> "))]
    IgnitionCycle(Vec<String>),

    #[error(
        "Mass conservation violated in stage {stage:?}: {full_mass} kg before, {empty_mass} kg after, {consumed} kg consumed"
    )]
    MassConservation {
        stage: String,
        full_mass: f64,
        empty_mass: f64,
        consumed: f64,
    },

    #[error("Cannot separate stage {0:?}: it still holds fuel")]
    StageNotEmpty(String),

    #[error("Rocket has no stages")]
    NoStages,

    #[error("Flight stalled at t={time:.2}s: ignited stages hold fuel but burn none")]
    Stalled { time: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Unable to map name {name:?} to a part. Best guess: {best:?} (ratio {best_ratio:.3}), second best guess: {second:?} (ratio {second_ratio:.3})"
    )]
    UnknownPart {
        name: String,
        best: String,
        best_ratio: f64,
        second: String,
        second_ratio: f64,
    },

    #[error("Invalid part count in {0:?}")]
    InvalidPartCount(String),

    #[error("No body named {0:?} found")]
    UnknownBody(String),

    #[error("More than one body named {0:?} found")]
    DuplicateBody(String),

    #[error("Unable to parse position {0:?}")]
    InvalidPosition(String),

    #[error("Failed to read design: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("No altitude samples inside the observation window for drag {drag}")]
    NoSamples { drag: f64 },

    #[error("Drag estimate did not converge after {iterations} iterations (bracket {min}..{max})")]
    NotConverged { iterations: usize, min: f64, max: f64 },

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}
