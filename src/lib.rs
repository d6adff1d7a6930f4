// lib.rs - Library exports for the binary and integration tests

pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod errors;
pub mod math;
pub mod models;
pub mod web;
