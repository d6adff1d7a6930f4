pub mod optimizer;
pub mod pricing;
pub mod service;
