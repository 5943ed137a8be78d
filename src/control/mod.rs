pub mod celestial;
pub mod design;
pub mod environment;
pub mod fuel_managment;
pub mod launch_stages;
pub mod parts;
pub mod payload;
pub mod propulsion;
pub mod rocket;
pub mod structure;
