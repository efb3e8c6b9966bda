//! Coop Dashboard - sensor monitoring and user administration for a
//! connected poultry farm.
//!
//! This library exposes the core modules for testing and reuse.

pub mod backend;
pub mod common;
pub mod config;
pub mod error;
pub mod mock;
pub mod poller;
pub mod render;
pub mod routes;
pub mod sensors;
pub mod services;
pub mod users;
