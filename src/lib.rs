pub mod app;
pub mod background;
pub mod config;
pub mod errors;
pub mod http;
pub mod notifiers;
pub mod signals;
pub mod sources;
pub mod state;
pub mod telemetry;
pub mod utils;
