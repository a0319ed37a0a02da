pub mod api;
pub mod classroom;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
