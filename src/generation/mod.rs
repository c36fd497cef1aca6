pub mod api;
pub mod gemini;
pub mod model;
pub mod prompt;
pub mod review;
pub mod schema;
pub mod service;
pub mod traceability;
