// Domain layer - Pure data models, no I/O
pub mod channel;
pub mod dashboard;
pub mod indicator;
pub mod telemetry;
