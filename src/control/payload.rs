use std::sync::Arc;

/// Dead weight: pods, parachutes, decouplers, struts.
#[derive(Clone, Debug, PartialEq)]
pub struct DeadWeight {
    pub name: Arc<str>,
    pub mass: f64, // kg
}

impl DeadWeight {
    pub fn new(name: &str, mass: f64) -> Self {
        DeadWeight {
            name: Arc::from(name),
            mass,
        }
    }

    pub fn get_mass(&self) -> f64 {
        self.mass
    }
}
