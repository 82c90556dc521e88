pub mod creators;
pub mod dto;
pub mod extract;
pub mod payments;
pub mod products;
pub mod rest;
pub mod state;
pub mod system;
pub mod transactions;

// Re-export the router builders so the binary can assemble the server in one place.
pub use rest::{api_router, cors_layer, ApiDoc};
pub use state::AppState;
