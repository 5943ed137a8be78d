use std::collections::HashMap;

use tracing::{debug, warn};

use super::launch_stages::{FuelSource, Stage, StageId, StageLinks, StageState, SELF_FUEL_SOURCE};
use crate::constants::MASS_CONSERVATION_TOLERANCE;
use crate::control::environment::Position;
use crate::errors::SimulationError;
use crate::utils::stats::mean;

/// Ordered stage stack. Index 0 is the top (payload end); the last index is
/// the bottom stage, which ignites and separates first.
#[derive(Clone, Debug, Default)]
pub struct Structure {
    stages: Vec<Stage>,
    next_id: usize,
}

impl Structure {
    pub fn new() -> Self {
        Structure::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn is_ignited(&self) -> bool {
        self.stages.iter().any(Stage::is_ignited)
    }

    pub fn append_stage(&mut self, mut stage: Stage) -> Result<StageId, SimulationError> {
        if self.is_ignited() {
            return Err(SimulationError::AlreadyIgnited);
        }
        let id = StageId(self.next_id);
        self.next_id += 1;
        stage.attach(id, format!("Stage #{}", self.stages.len() + 1));
        self.stages.push(stage);
        Ok(id)
    }

    pub fn index_of(&self, id: StageId) -> Option<usize> {
        self.stages.iter().position(|stage| stage.id() == Some(id))
    }

    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.index_of(id).map(|index| &self.stages[index])
    }

    pub fn get_stage(&self, name: &str) -> Result<&Stage, SimulationError> {
        let mut found = self.stages.iter().filter(|stage| stage.name() == name);
        match (found.next(), found.next()) {
            (Some(stage), None) => Ok(stage),
            (Some(_), Some(_)) => Err(SimulationError::DuplicateStage(name.to_string())),
            (None, _) => Err(SimulationError::StageNotFound(name.to_string())),
        }
    }

    fn stage_id(&self, name: &str) -> Result<StageId, SimulationError> {
        let stage = self.get_stage(name)?;
        stage
            .id()
            .ok_or_else(|| SimulationError::StageNotFound(name.to_string()))
    }

    /// Turns `ignites`/`takes_fuel` names into stage ids and rejects ignition
    /// cycles.
    pub fn resolve_links(&mut self) -> Result<(), SimulationError> {
        let mut resolved = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let ignites = stage
                .ignites()
                .iter()
                .map(|name| self.stage_id(name))
                .collect::<Result<Vec<_>, _>>()?;
            let fuel_sources = stage
                .takes_fuel()
                .iter()
                .map(|name| {
                    if name == SELF_FUEL_SOURCE {
                        Ok(FuelSource::Own)
                    } else {
                        self.stage_id(name).map(FuelSource::Stage)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push(StageLinks {
                ignites,
                fuel_sources,
            });
        }

        for (stage, links) in self.stages.iter_mut().zip(resolved) {
            stage.set_links(links);
        }
        self.check_ignition_cycles()
    }

    fn check_ignition_cycles(&self) -> Result<(), SimulationError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            structure: &Structure,
            id: StageId,
            marks: &mut HashMap<StageId, Mark>,
            path: &mut Vec<StageId>,
        ) -> Result<(), SimulationError> {
            match marks.get(&id) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|step| *step == id).unwrap_or(0);
                    let mut names: Vec<String> = path[start..]
                        .iter()
                        .filter_map(|step| structure.stage(*step))
                        .map(|stage| stage.name().to_string())
                        .collect();
                    if let Some(stage) = structure.stage(id) {
                        names.push(stage.name().to_string());
                    }
                    return Err(SimulationError::IgnitionCycle(names));
                }
                None => {}
            }

            marks.insert(id, Mark::Visiting);
            path.push(id);
            if let Some(links) = structure.stage(id).and_then(Stage::links) {
                for next in &links.ignites {
                    visit(structure, *next, marks, path)?;
                }
            }
            path.pop();
            marks.insert(id, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        for stage in &self.stages {
            if let Some(id) = stage.id() {
                visit(self, id, &mut marks, &mut Vec::new())?;
            }
        }
        Ok(())
    }

    /// Ignites the stage at `index` and, recursively, every stage it names in
    /// `ignites`. No-op for an already ignited stage.
    pub fn ignite_stage(&mut self, index: usize) {
        if !self.stages[index].mark_ignited() {
            return;
        }
        debug!(stage = self.stages[index].name(), "stage ignited");

        let cascade = self.stages[index]
            .links()
            .map(|links| links.ignites.clone())
            .unwrap_or_default();
        for id in cascade {
            if let Some(next) = self.index_of(id) {
                self.ignite_stage(next);
            }
        }
    }

    /// Ignites the bottom stage when nothing burns yet.
    pub fn ignite_next_stage(&mut self) {
        if self.is_ignited() {
            return;
        }
        if let Some(bottom) = self.stages.len().checked_sub(1) {
            self.ignite_stage(bottom);
        }
    }

    pub fn ignited_ids(&self) -> Vec<StageId> {
        self.stages
            .iter()
            .filter(|stage| stage.is_ignited())
            .filter_map(Stage::id)
            .collect()
    }

    /// Indices of the stages whose tanks the stage at `index` drains, in draw
    /// order. Separated sources are skipped.
    pub fn fuel_source_indices(&self, index: usize) -> Vec<usize> {
        let sources = self.stages[index]
            .links()
            .map(|links| links.fuel_sources.as_slice())
            .unwrap_or_default();
        if sources.is_empty() {
            return vec![index];
        }

        sources
            .iter()
            .filter_map(|source| match source {
                FuelSource::Own => Some(index),
                FuelSource::Stage(id) => self.index_of(*id),
            })
            .collect()
    }

    /// Forgets cross-feed sources that were separated.
    fn drop_stale_sources(&mut self, index: usize) {
        let attached: Vec<StageId> = self.stages.iter().filter_map(Stage::id).collect();
        let name = self.stages[index].name().to_string();
        if let Some(links) = self.stages[index].links_mut() {
            links.fuel_sources.retain(|source| match source {
                FuelSource::Own => true,
                FuelSource::Stage(id) => {
                    let alive = attached.contains(id);
                    if !alive {
                        warn!(stage = %name, "dropping separated fuel source");
                    }
                    alive
                }
            });
        }
    }

    pub fn stage_is_empty(&self, index: usize) -> bool {
        self.fuel_source_indices(index)
            .into_iter()
            .all(|source| !self.stages[source].has_local_fuel())
    }

    /// Drains `amount` kg for the stage at `index`, emptying each tank before
    /// moving on. Returns the kilograms that could not be drawn.
    pub fn consume(&mut self, index: usize, mut amount: f64) -> f64 {
        for source in self.fuel_source_indices(index) {
            for tank in self.stages[source].local_fuel_tanks_mut() {
                amount = tank.consume(amount);
                if amount == 0.0 {
                    return 0.0;
                }
            }
        }
        amount
    }

    /// Burns one tick of fuel for the stage at `index`.
    pub fn step_stage(
        &mut self,
        index: usize,
        dt: f64,
        position: &Position,
    ) -> Result<f64, SimulationError> {
        self.drop_stale_sources(index);
        if self.stage_is_empty(index) {
            return Ok(0.0);
        }

        let full_mass = self.get_total_mass();
        let consume_max = self.stages[index].consumption_kg(position) * dt;
        let consumed = consume_max - self.consume(index, consume_max);
        let empty_mass = self.get_total_mass();

        if (full_mass - (empty_mass + consumed)).abs() >= MASS_CONSERVATION_TOLERANCE {
            return Err(SimulationError::MassConservation {
                stage: self.stages[index].name().to_string(),
                full_mass,
                empty_mass,
                consumed,
            });
        }
        Ok(consumed)
    }

    /// Burns one tick across every ignited stage.
    pub fn step(&mut self, dt: f64, position: &Position) -> Result<f64, SimulationError> {
        let mut consumed = 0.0;
        for id in self.ignited_ids() {
            if let Some(index) = self.index_of(id) {
                consumed += self.step_stage(index, dt, position)?;
            }
        }
        Ok(consumed)
    }

    /// Removes the stage at `index` and everything below it, bottom stage
    /// first. Every removed stage must be empty.
    pub fn separate_stage(&mut self, index: usize) -> Result<Vec<Stage>, SimulationError> {
        let mut separated = Vec::with_capacity(self.stages.len().saturating_sub(index));
        while self.stages.len() > index {
            let bottom = self.stages.len() - 1;
            if !self.stage_is_empty(bottom) {
                return Err(SimulationError::StageNotEmpty(
                    self.stages[bottom].name().to_string(),
                ));
            }
            if let Some(stage) = self.stages.pop() {
                debug!(stage = stage.name(), "stage separated");
                separated.push(stage);
            }
        }
        Ok(separated)
    }

    pub fn get_total_mass(&self) -> f64 {
        self.stages.iter().map(Stage::get_total_mass).sum()
    }

    pub fn get_total_fuel(&self) -> f64 {
        self.stages
            .iter()
            .flat_map(Stage::local_fuel_tanks)
            .map(|tank| tank.fuel_mass())
            .sum()
    }

    pub fn weight(&self, position: &Position) -> f64 {
        self.stages.iter().map(|stage| stage.weight(position)).sum()
    }

    pub fn thrust(&self) -> f64 {
        self.stages
            .iter()
            .filter(|stage| stage.is_ignited())
            .map(Stage::thrust)
            .sum()
    }

    /// Mean of the per-stage Isp of ignited stages.
    pub fn isp(&self, position: &Position) -> f64 {
        mean(
            self.stages
                .iter()
                .filter(|stage| stage.is_ignited())
                .map(|stage| stage.isp(position)),
        )
    }

    pub fn stage_state(&self, index: usize) -> StageState {
        if self.stage_is_empty(index) {
            StageState::Empty
        } else if self.stages[index].is_ignited() {
            StageState::Ignited
        } else {
            StageState::Unignited
        }
    }
}
