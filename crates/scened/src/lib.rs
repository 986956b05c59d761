pub mod api;
pub mod config;
pub mod engine;
pub mod integrations;
pub mod light;

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use engine::Dispatcher;
pub use engine::ReproduceReport;
pub use engine::Reproducer;
pub use engine::StateStore;
pub use light::Command;
pub use light::EntityState;
