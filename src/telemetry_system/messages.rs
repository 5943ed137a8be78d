//! Events produced by a flight.
//!
//! A `FlightLog` keeps the raw state of one tick; every derived quantity is
//! computed on first access and cached in the message.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::control::launch_stages::Stage;
use crate::trajectory_system::aerodynamics::drag_force;

/// Rocket state sampled right after the tick's fuel was burned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSample {
    pub isp: f64,
    pub g: f64,
    pub end_mass: f64,
    pub thrust: f64,
    pub weight: f64,
    /// Speed at the start of the tick.
    pub speed: f64,
    pub drag_coefficient: f64,
    pub air_density: f64,
}

#[derive(Clone, Debug)]
pub struct FlightLog {
    pub dt: f64,
    pub rocket: Arc<str>,
    pub abs_time: f64,
    pub consumed_kg: f64,
    sample: TickSample,
    speed_after: f64,
    altitude_after: f64,
    start_mass: OnceCell<f64>,
    thrust_to_weight: OnceCell<f64>,
    tsiolkovsky_dv: OnceCell<f64>,
    drag_force: OnceCell<f64>,
    effective_a: OnceCell<f64>,
}

impl FlightLog {
    pub fn new(dt: f64, rocket: Arc<str>, abs_time: f64, consumed_kg: f64, sample: TickSample) -> Self {
        FlightLog {
            dt,
            rocket,
            abs_time,
            consumed_kg,
            sample,
            speed_after: sample.speed,
            altitude_after: 0.0,
            start_mass: OnceCell::new(),
            thrust_to_weight: OnceCell::new(),
            tsiolkovsky_dv: OnceCell::new(),
            drag_force: OnceCell::new(),
            effective_a: OnceCell::new(),
        }
    }

    /// Records where the tick left the rocket.
    pub(crate) fn record_motion(&mut self, speed: f64, surface_altitude: f64) {
        self.speed_after = speed;
        self.altitude_after = surface_altitude;
    }

    pub fn sample(&self) -> &TickSample {
        &self.sample
    }

    pub fn isp(&self) -> f64 {
        self.sample.isp
    }

    pub fn g(&self) -> f64 {
        self.sample.g
    }

    pub fn end_mass(&self) -> f64 {
        self.sample.end_mass
    }

    pub fn start_mass(&self) -> f64 {
        *self
            .start_mass
            .get_or_init(|| self.sample.end_mass + self.consumed_kg)
    }

    pub fn thrust_to_weight(&self) -> f64 {
        *self
            .thrust_to_weight
            .get_or_init(|| self.sample.thrust / self.sample.weight)
    }

    pub fn tsiolkovsky_dv(&self) -> f64 {
        *self.tsiolkovsky_dv.get_or_init(|| {
            self.g() * self.isp() * (self.start_mass() / self.end_mass()).ln()
        })
    }

    pub fn tsiolkovsky_da(&self) -> f64 {
        self.tsiolkovsky_dv() / self.dt
    }

    pub fn drag_force(&self) -> f64 {
        *self.drag_force.get_or_init(|| {
            drag_force(
                self.sample.air_density,
                self.sample.speed,
                self.sample.drag_coefficient,
            )
        })
    }

    pub fn drag_deceleration(&self) -> f64 {
        self.drag_force() / self.end_mass()
    }

    pub fn effective_a(&self) -> f64 {
        *self
            .effective_a
            .get_or_init(|| self.tsiolkovsky_da() - self.g() - self.drag_deceleration())
    }

    pub fn effective_dv(&self) -> f64 {
        self.effective_a() * self.dt
    }

    /// Speed after the tick was integrated.
    pub fn speed(&self) -> f64 {
        self.speed_after
    }

    /// Height above ground after the tick was integrated.
    pub fn surface_altitude(&self) -> f64 {
        self.altitude_after
    }

    pub fn fields(&self) -> BTreeMap<&'static str, Value> {
        let values: [(&'static str, f64); 17] = [
            ("absTime", self.abs_time),
            ("consumedKg", self.consumed_kg),
            ("Isp", self.isp()),
            ("g", self.g()),
            ("startMass", self.start_mass()),
            ("endMass", self.end_mass()),
            ("thrustToWeightRatio", self.thrust_to_weight()),
            ("tsiolkovskydV", self.tsiolkovsky_dv()),
            ("tsiolkovskydA", self.tsiolkovsky_da()),
            ("dragCoef", self.sample.drag_coefficient),
            ("airDensity", self.sample.air_density),
            ("dragForce", self.drag_force()),
            ("dragDeAccel", self.drag_deceleration()),
            ("effectiveA", self.effective_a()),
            ("effectivedV", self.effective_dv()),
            ("speed", self.speed()),
            ("altitude", self.surface_altitude()),
        ];
        values
            .into_iter()
            .map(|(name, value)| (name, Value::from(value)))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct StageSeparation {
    pub dt: f64,
    pub rocket: Arc<str>,
    pub abs_time: f64,
    pub stage: Stage,
}

impl StageSeparation {
    pub fn new(dt: f64, rocket: Arc<str>, abs_time: f64, stage: Stage) -> Self {
        StageSeparation {
            dt,
            rocket,
            abs_time,
            stage,
        }
    }

    pub fn fields(&self) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([
            ("absTime", Value::from(self.abs_time)),
            ("dt", Value::from(self.dt)),
            ("stageName", Value::from(self.stage.name())),
        ])
    }
}

#[derive(Clone, Debug)]
pub enum Message {
    FlightLog(FlightLog),
    StageSeparation(StageSeparation),
}

impl Message {
    pub fn abs_time(&self) -> f64 {
        match self {
            Message::FlightLog(log) => log.abs_time,
            Message::StageSeparation(separation) => separation.abs_time,
        }
    }

    pub fn dt(&self) -> f64 {
        match self {
            Message::FlightLog(log) => log.dt,
            Message::StageSeparation(separation) => separation.dt,
        }
    }

    pub fn rocket(&self) -> &str {
        match self {
            Message::FlightLog(log) => &log.rocket,
            Message::StageSeparation(separation) => &separation.rocket,
        }
    }

    pub fn msg_type(&self) -> &'static str {
        match self {
            Message::FlightLog(_) => "FlightLog",
            Message::StageSeparation(_) => "StageSeparation",
        }
    }

    /// Every field of the message plus its `msgType`.
    pub fn fields(&self) -> BTreeMap<&'static str, Value> {
        let mut fields = match self {
            Message::FlightLog(log) => log.fields(),
            Message::StageSeparation(separation) => separation.fields(),
        };
        fields.insert("msgType", Value::from(self.msg_type()));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn create_sample() -> TickSample {
        TickSample {
            isp: 300.0,
            g: 9.81,
            end_mass: 2000.0,
            thrust: 200_000.0,
            weight: 2000.0 * 9.81,
            speed: 100.0,
            drag_coefficient: 0.5,
            air_density: 1.2,
        }
    }

    #[test]
    fn test_derived_fields() {
        let log = FlightLog::new(0.1, Arc::from("Test"), 3.0, 10.0, create_sample());

        assert_abs_diff_eq!(log.start_mass(), 2010.0, epsilon = 1e-12);
        assert_abs_diff_eq!(log.thrust_to_weight(), 200_000.0 / 19_620.0, epsilon = 1e-12);
        let dv = 9.81 * 300.0 * (2010.0f64 / 2000.0).ln();
        assert_abs_diff_eq!(log.tsiolkovsky_dv(), dv, epsilon = 1e-9);
        assert_abs_diff_eq!(log.tsiolkovsky_da(), dv / 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(log.drag_force(), 0.5 * 1.2 * 100.0 * 100.0 * 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(log.drag_deceleration(), 3000.0 / 2000.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            log.effective_dv(),
            (dv / 0.1 - 9.81 - 1.5) * 0.1,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_fields_are_memoized() {
        let log = FlightLog::new(0.1, Arc::from("Test"), 0.0, 10.0, create_sample());

        assert!(log.tsiolkovsky_dv.get().is_none());
        let first = log.effective_a();
        assert!(log.tsiolkovsky_dv.get().is_some());
        assert!(log.drag_force.get().is_some());
        assert_eq!(log.effective_a(), first);
    }

    #[test]
    fn test_fields_map() {
        let mut log = FlightLog::new(0.1, Arc::from("Test"), 1.0, 10.0, create_sample());
        log.record_motion(101.0, 42.0);

        let fields = log.fields();
        assert_eq!(fields["speed"], 101.0);
        assert_eq!(fields["altitude"], 42.0);
        assert_eq!(fields["absTime"], 1.0);
        assert_eq!(fields.len(), 17);
        assert_eq!(Message::FlightLog(log).fields()["msgType"], "FlightLog");
    }

    #[test]
    fn test_message_accessors() {
        let message = Message::FlightLog(FlightLog::new(
            0.25,
            Arc::from("Kerbal X"),
            2.5,
            1.0,
            create_sample(),
        ));

        assert_eq!(message.abs_time(), 2.5);
        assert_eq!(message.dt(), 0.25);
        assert_eq!(message.rocket(), "Kerbal X");
        assert_eq!(message.msg_type(), "FlightLog");
    }

    #[test]
    fn test_separation_fields() {
        let stage = Stage::with_parts("Booster", Vec::new());
        let message = Message::StageSeparation(StageSeparation::new(
            0.1,
            Arc::from("Kerbal X"),
            14.6,
            stage,
        ));

        let fields = message.fields();
        assert_eq!(fields["absTime"], 14.6);
        assert_eq!(fields["dt"], 0.1);
        assert_eq!(fields["stageName"], "Booster");
        assert_eq!(fields["msgType"], "StageSeparation");
        assert_eq!(fields.len(), 4);
    }
}
