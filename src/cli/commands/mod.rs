//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod generate;
mod probe;
mod search;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::run_generate;
pub use probe::run_probe;
pub use search::run_search;
pub use serve::{router, run_serve};
