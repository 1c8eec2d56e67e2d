pub mod config;
pub mod domain;
pub mod email_client;
pub mod routes;
mod startup;
pub mod telemetry;
mod util;

pub use startup::run;
