pub mod metrics;
pub mod models;
pub mod views;

#[cfg(test)]
mod tests;
