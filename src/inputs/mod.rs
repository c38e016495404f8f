//! Input records consumed by the engine and the CSV scenario loader

mod data;
pub mod loader;

pub use data::{
    IncentiveInputs, ProjectInputs, Scenario, DEFAULT_SELLING_PRICE_PER_KG, HOURS_PER_YEAR,
};
pub use loader::{load_scenarios, load_scenarios_from_reader};

pub(crate) use data::validate_selling_price;
