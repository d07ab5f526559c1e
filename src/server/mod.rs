pub mod builder;
mod dashboard;
pub mod handler;
pub mod listener;

pub use builder::ServerBuilder;
pub use handler::HealthHandler;
