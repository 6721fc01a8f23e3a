pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{issue_token, verify_token, Claims, SESSION_COOKIE};
