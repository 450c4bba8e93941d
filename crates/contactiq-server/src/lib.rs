//! ContactIQ HTTP server — routing, shared state, and the background OCR
//! worker. The `contactiq` binary wires this together from the environment.

pub mod jobs;
pub mod routes;
pub mod state;
