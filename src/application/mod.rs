// Application layer - inference algorithms and orchestration
pub mod generator;
pub mod orchestrator;
pub mod power_repository;
pub mod status;
pub mod timeline;
