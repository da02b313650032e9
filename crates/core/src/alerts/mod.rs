pub mod actions;
pub mod engine;
pub mod health;
