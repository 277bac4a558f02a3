pub mod errors;
pub mod models;
pub mod state;
pub mod utils;
pub mod views;
