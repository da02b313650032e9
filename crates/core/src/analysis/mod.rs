pub mod portfolio;
pub mod selector;
pub mod strategy;
