pub mod chatops;
pub mod config;
pub mod error;
pub mod ethics;
pub mod intake;
pub mod pipeline;
pub mod survey;
pub mod telemetry;
