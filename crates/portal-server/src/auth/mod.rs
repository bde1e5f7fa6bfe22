mod middleware;
mod password;

pub use middleware::{auth_middleware, AuthUser};
pub use password::{hash_password, verify_password};
