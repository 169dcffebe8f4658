pub mod api;
pub mod errors;
pub mod model_artifacts;
pub mod prediction;
pub mod utils;
