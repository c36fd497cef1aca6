pub mod api;
pub mod model;
pub mod seed;
pub mod service;
pub mod stats;
pub mod validation;
