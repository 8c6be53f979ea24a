pub mod api;
pub mod assistant;
pub mod cli;
pub mod core;
pub mod intake;
pub mod origin;
pub mod review;
pub mod session;
pub mod storage;
pub mod workflow;
