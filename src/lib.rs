pub mod analysis;
pub mod client;
pub mod collector;
pub mod extract;
pub mod model;
pub mod monitoring;
pub mod report;
pub mod runner;
pub mod types;
pub mod utils;

pub use crate::model::*;
