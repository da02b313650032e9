pub mod alert;
pub mod metrics;
pub mod observation;
pub mod pricing;
pub mod product;
