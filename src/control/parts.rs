use std::sync::Arc;

use crate::control::environment::Position;
use crate::control::fuel_managment::FuelTank;
use crate::control::payload::DeadWeight;
use crate::control::propulsion::{ConsumptionRate, Engine};
use crate::errors::ConfigError;

const MIN_MATCH_RATIO: f64 = 0.5;
const AMBIGUITY_FACTOR: f64 = 1.5;

#[derive(Clone, Debug, PartialEq)]
pub enum Part {
    Weight(DeadWeight),
    FuelTank(FuelTank),
    Engine(Engine),
}

impl Part {
    pub fn name(&self) -> &Arc<str> {
        match self {
            Part::Weight(weight) => &weight.name,
            Part::FuelTank(tank) => &tank.name,
            Part::Engine(engine) => &engine.name,
        }
    }

    pub fn get_mass(&self) -> f64 {
        match self {
            Part::Weight(weight) => weight.get_mass(),
            Part::FuelTank(tank) => tank.get_mass(),
            Part::Engine(engine) => engine.mass,
        }
    }

    pub fn weight(&self, position: &Position) -> f64 {
        self.get_mass() * position.g()
    }

    pub fn is_engine(&self) -> bool {
        matches!(self, Part::Engine(_))
    }

    pub fn is_fuel_tank(&self) -> bool {
        matches!(self, Part::FuelTank(_))
    }

    pub fn as_engine(&self) -> Option<&Engine> {
        match self {
            Part::Engine(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn as_fuel_tank(&self) -> Option<&FuelTank> {
        match self {
            Part::FuelTank(tank) => Some(tank),
            _ => None,
        }
    }

    pub fn as_fuel_tank_mut(&mut self) -> Option<&mut FuelTank> {
        match self {
            Part::FuelTank(tank) => Some(tank),
            _ => None,
        }
    }
}

/// Read-only library of part prototypes. Resolved parts are fresh clones.
#[derive(Clone, Debug)]
pub struct PartCatalog {
    parts: Vec<Part>,
}

impl PartCatalog {
    pub fn new(parts: Vec<Part>) -> Self {
        PartCatalog { parts }
    }

    pub fn stock() -> Self {
        PartCatalog::new(vec![
            Part::Weight(DeadWeight::new("Command Pod Mk1", 800.0)),
            Part::Weight(DeadWeight::new("Mk16 Parachute", 100.0)),
            Part::Weight(DeadWeight::new("TR-18A Stack Decoupler", 50.0)),
            Part::Weight(DeadWeight::new("LT-2(1) Landing Strut", 5.0)),
            Part::FuelTank(FuelTank::new("FL-T200 Fuel Tank", 125.0, 1125.0, 200.0)),
            Part::Engine(Engine::new(
                "LV-909 Liquid Fuel Engine",
                500.0,
                50_000.0,
                ConsumptionRate::PressureDependent {
                    atmosphere: 3.4,
                    vacuum: 2.6,
                },
            )),
            Part::Engine(Engine::new(
                "LV-T45 Liquid Fuel Engine",
                1500.0,
                200_000.0,
                ConsumptionRate::PressureDependent {
                    atmosphere: 12.7,
                    vacuum: 11.0,
                },
            )),
            Part::Engine(Engine::new(
                "LV-T30 Liquid Fuel Engine",
                1250.0,
                215_000.0,
                ConsumptionRate::PressureDependent {
                    atmosphere: 13.7,
                    vacuum: 11.8,
                },
            )),
        ])
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Fuzzy lookup. An exact (case-insensitive) name always wins; otherwise
    /// the best match must be clear of the runner-up.
    pub fn find_by_name(&self, name: &str) -> Result<&Part, ConfigError> {
        let query = name.trim().to_lowercase();

        if let Some(part) = self
            .parts
            .iter()
            .find(|part| part.name().to_lowercase() == query)
        {
            return Ok(part);
        }

        let mut weighted: Vec<(f64, &Part)> = self
            .parts
            .iter()
            .map(|part| {
                let ratio = strsim::normalized_levenshtein(&query, &part.name().to_lowercase());
                (ratio, part)
            })
            .collect();
        weighted.sort_by(|a, b| b.0.total_cmp(&a.0));

        let (best_ratio, best) = weighted.first().copied().ok_or_else(|| unknown(name))?;
        let (second_ratio, second) = weighted.get(1).copied().unwrap_or((0.0, best));

        let best_name = best.name().to_lowercase();
        let second_name = second.name().to_lowercase();

        let unclear = best_ratio < MIN_MATCH_RATIO || second_ratio * AMBIGUITY_FACTOR > best_ratio;
        let not_a_prefix = !best_name.starts_with(&query) || second_name.contains(&query);

        if unclear && not_a_prefix {
            return Err(ConfigError::UnknownPart {
                name: name.to_string(),
                best: best.name().to_string(),
                best_ratio,
                second: second.name().to_string(),
                second_ratio,
            });
        }

        Ok(best)
    }

    /// Resolves a design entry such as `"2x FL-T200 Fuel Tank"`.
    pub fn resolve_entry(&self, entry: &str) -> Result<Vec<Part>, ConfigError> {
        let (times, name) = split_count(entry)?;
        let part = self.find_by_name(name)?;
        Ok(vec![part.clone(); times])
    }
}

fn unknown(name: &str) -> ConfigError {
    ConfigError::UnknownPart {
        name: name.to_string(),
        best: String::new(),
        best_ratio: 0.0,
        second: String::new(),
        second_ratio: 0.0,
    }
}

/// Splits an optional `"<N>x "` prefix off a part entry.
fn split_count(entry: &str) -> Result<(usize, &str), ConfigError> {
    let entry = entry.trim();
    let digits = entry
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(entry.len());
    if digits == 0 {
        return Ok((1, entry));
    }

    let rest = entry[digits..].trim_start();
    match rest.strip_prefix(['x', 'X']) {
        Some(name) if name.starts_with(char::is_whitespace) => {
            let times: usize = entry[..digits]
                .parse()
                .map_err(|_| ConfigError::InvalidPartCount(entry.to_string()))?;
            if times == 0 {
                return Err(ConfigError::InvalidPartCount(entry.to_string()));
            }
            Ok((times, name.trim()))
        }
        _ => Ok((1, entry)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup_never_fails() {
        let catalog = PartCatalog::stock();

        for part in catalog.parts() {
            let found = catalog.find_by_name(part.name()).unwrap();
            assert_eq!(found.name(), part.name());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = PartCatalog::stock();
        let part = catalog.find_by_name("lv-t30 liquid fuel engine").unwrap();
        assert!(part.is_engine());
    }

    #[test]
    fn test_prefix_lookup() {
        let catalog = PartCatalog::stock();

        let engine = catalog.find_by_name("LV-T30").unwrap();
        assert_eq!(&**engine.name(), "LV-T30 Liquid Fuel Engine");

        let tank = catalog.find_by_name("FL-T200").unwrap();
        assert!(tank.is_fuel_tank());
    }

    #[test]
    fn test_unknown_part() {
        let catalog = PartCatalog::stock();

        assert!(matches!(
            catalog.find_by_name("Banana split"),
            Err(ConfigError::UnknownPart { .. })
        ));
    }

    #[test]
    fn test_ambiguous_part() {
        let catalog = PartCatalog::stock();

        // Matches every engine equally well.
        assert!(matches!(
            catalog.find_by_name("Liquid Fuel Engine"),
            Err(ConfigError::UnknownPart { .. })
        ));
    }

    #[test]
    fn test_resolve_entry_with_count() {
        let catalog = PartCatalog::stock();

        let parts = catalog.resolve_entry("3x FL-T200 Fuel Tank").unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(Part::is_fuel_tank));

        let single = catalog.resolve_entry("  Mk16 Parachute ").unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].get_mass(), 100.0);
    }

    #[test]
    fn test_split_count() {
        assert_eq!(split_count("2x Pod").unwrap(), (2, "Pod"));
        assert_eq!(split_count("12 X Pod").unwrap(), (12, "Pod"));
        assert_eq!(split_count("LV-T30").unwrap(), (1, "LV-T30"));
        assert_eq!(split_count("200 litres").unwrap(), (1, "200 litres"));
        assert!(matches!(
            split_count("0x Pod"),
            Err(ConfigError::InvalidPartCount(_))
        ));
    }
}
