pub mod load;
pub mod model;
pub mod save;

pub use load::{load_config, load_or_create, LoadOutcome};
pub use model::Config;
pub use save::save_config;
