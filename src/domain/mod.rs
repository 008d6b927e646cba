// Domain layer - value types shared across the engine
pub mod building;
pub mod observation;
pub mod power;
pub mod telemetry;
