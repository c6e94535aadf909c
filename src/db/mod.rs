mod pool;
mod seed;

pub use pool::{create_lazy_pool, create_pool, migrate};
pub use seed::{reset_demo_data, DEMO_USERS};
