pub mod autopilot;
pub mod constants;
pub mod engine;
pub mod grid;
pub mod presentation;
pub mod rng;
pub mod types;
pub mod world;
