pub mod analysis;
pub mod config;
pub mod errors;
pub mod extract;
pub mod models;
pub mod scrub;
pub mod util;
