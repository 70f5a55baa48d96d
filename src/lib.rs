//! Study assistant backend library: quiz evaluation, chat replies, view
//! orchestration and the HTTP/WebSocket surface used by the SPA.

pub mod backend;
pub mod chat;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod forms;
pub mod logic;
pub mod orchestrator;
pub mod protocol;
pub mod quiz;
pub mod routes;
pub mod state;
pub mod telemetry;
