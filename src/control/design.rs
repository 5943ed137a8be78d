//! Rocket design documents.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::control::environment::Position;
use crate::control::launch_stages::Stage;
use crate::control::parts::PartCatalog;
use crate::control::rocket::{Rocket, DEFAULT_ROCKET_NAME};
use crate::errors::ConfigError;

/// A single name or a list of names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(name) => vec![name],
            OneOrMany::Many(names) => names,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StageDesign {
    #[serde(default)]
    pub name: Option<String>,
    pub parts: Vec<String>,
    #[serde(default)]
    pub ignites: Option<OneOrMany>,
    #[serde(default, rename = "takesFuel")]
    pub takes_fuel: Option<OneOrMany>,
}

/// Stages are listed top (payload) first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RocketDesign {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub drag: f64,
    pub stages: Vec<StageDesign>,
}

impl RocketDesign {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a design from YAML, or TOML when the file ends in `.toml`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
            Self::from_toml_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    pub fn build(&self, catalog: &PartCatalog, position: Position) -> Result<Rocket, ConfigError> {
        let name = self.name.as_deref().unwrap_or(DEFAULT_ROCKET_NAME);
        let mut rocket = Rocket::new(name, position).with_drag(self.drag);

        for stage in &self.stages {
            let mut parts = Vec::new();
            for entry in &stage.parts {
                parts.extend(catalog.resolve_entry(entry)?);
            }
            let ignites = stage.ignites.clone().map(OneOrMany::into_vec).unwrap_or_default();
            let takes_fuel = stage
                .takes_fuel
                .clone()
                .map(OneOrMany::into_vec)
                .unwrap_or_default();

            rocket.append_stage(Stage::new(stage.name.as_deref(), parts, ignites, takes_fuel)?)?;
        }
        // Surface bad references before the first flight.
        rocket.structure.resolve_links()?;
        Ok(rocket)
    }
}
