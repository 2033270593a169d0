pub mod favorites;
pub mod handlers;
pub mod middleware;
pub mod records;
pub mod routes;
pub mod selection;

pub use routes::create_router;
