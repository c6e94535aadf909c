pub mod auth_handlers;
mod json;
pub mod post_handlers;
pub mod user_handlers;

pub use auth_handlers::auth_routes;
pub use json::ApiJson;
pub use post_handlers::post_routes;
pub use user_handlers::user_routes;
