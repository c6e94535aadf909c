mod jwt;
mod middleware;
mod password;

pub use jwt::{decode_token, decode_token_of, encode_token, Claims, TokenUse};
pub use middleware::{auth_middleware, AuthUser};
pub use password::{hash_password, verify_password};
