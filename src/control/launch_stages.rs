use crate::control::environment::Position;
use crate::control::fuel_managment::FuelTank;
use crate::control::parts::Part;
use crate::control::propulsion::Engine;
use crate::errors::SimulationError;
use crate::utils::stats::mean;

pub const SELF_FUEL_SOURCE: &str = "self";

/// Stable handle of a stage attached to a rocket. Survives separations of
/// other stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuelSource {
    Own,
    Stage(StageId),
}

/// Cross-stage references resolved to ids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageLinks {
    pub ignites: Vec<StageId>,
    /// Empty when the stage burns its own tanks only.
    pub fuel_sources: Vec<FuelSource>,
}

/// Emptiness depends on cross-feed, so the state is queried through
/// `Structure::stage_state`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageState {
    Unignited,
    Ignited,
    Empty,
}

#[derive(Clone, Debug)]
pub struct Stage {
    name: Option<String>,
    id: Option<StageId>,
    parts: Vec<Part>,
    ignites: Vec<String>,
    takes_fuel: Vec<String>,
    links: Option<StageLinks>,
    ignited: bool,
}

impl Stage {
    pub fn new(
        name: Option<&str>,
        parts: Vec<Part>,
        ignites: Vec<String>,
        takes_fuel: Vec<String>,
    ) -> Result<Self, SimulationError> {
        if !takes_fuel.is_empty() && !takes_fuel.iter().any(|name| name == SELF_FUEL_SOURCE) {
            return Err(SimulationError::MissingSelfFuelSource(
                name.unwrap_or("unnamed stage").to_string(),
            ));
        }

        Ok(Stage {
            name: name.map(str::to_string),
            id: None,
            parts,
            ignites,
            takes_fuel,
            links: None,
            ignited: false,
        })
    }

    /// A stage with no cross-stage references.
    pub fn with_parts(name: &str, parts: Vec<Part>) -> Self {
        Stage {
            name: Some(name.to_string()),
            id: None,
            parts,
            ignites: Vec::new(),
            takes_fuel: Vec::new(),
            links: None,
            ignited: false,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn id(&self) -> Option<StageId> {
        self.id
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn ignites(&self) -> &[String] {
        &self.ignites
    }

    pub fn takes_fuel(&self) -> &[String] {
        &self.takes_fuel
    }

    pub fn links(&self) -> Option<&StageLinks> {
        self.links.as_ref()
    }

    pub(crate) fn set_links(&mut self, links: StageLinks) {
        self.links = Some(links);
    }

    pub(crate) fn links_mut(&mut self) -> Option<&mut StageLinks> {
        self.links.as_mut()
    }

    /// Binds the stage to a rocket. A stage is attached exactly once.
    pub(crate) fn attach(&mut self, id: StageId, default_name: String) {
        assert!(self.id.is_none(), "Stage {:?} is already attached", self.name());
        self.id = Some(id);
        if self.name.is_none() {
            self.name = Some(default_name);
        }
    }

    pub fn is_ignited(&self) -> bool {
        self.ignited
    }

    /// Marks the stage ignited. Returns `false` when it already was.
    pub(crate) fn mark_ignited(&mut self) -> bool {
        if self.ignited {
            return false;
        }
        self.ignited = true;
        true
    }

    pub fn engines(&self) -> impl Iterator<Item = &Engine> {
        self.parts.iter().filter_map(Part::as_engine)
    }

    pub fn local_fuel_tanks(&self) -> impl Iterator<Item = &FuelTank> {
        self.parts.iter().filter_map(Part::as_fuel_tank)
    }

    pub(crate) fn local_fuel_tanks_mut(&mut self) -> impl Iterator<Item = &mut FuelTank> {
        self.parts.iter_mut().filter_map(Part::as_fuel_tank_mut)
    }

    pub fn has_local_fuel(&self) -> bool {
        self.local_fuel_tanks().any(|tank| !tank.is_empty())
    }

    pub fn get_total_mass(&self) -> f64 {
        self.parts.iter().map(Part::get_mass).sum()
    }

    pub fn weight(&self, position: &Position) -> f64 {
        self.parts.iter().map(|part| part.weight(position)).sum()
    }

    pub fn thrust(&self) -> f64 {
        self.engines().map(|engine| engine.thrust).sum()
    }

    pub fn consumption_kg(&self, position: &Position) -> f64 {
        self.engines()
            .map(|engine| engine.consumption_kg(position))
            .sum()
    }

    pub fn isp(&self, position: &Position) -> f64 {
        mean(self.engines().map(|engine| engine.isp(position)))
    }
}
