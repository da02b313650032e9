pub mod cache;
pub mod harvester;
pub mod pacing;
pub mod transport;
