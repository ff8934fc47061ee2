//! Authentication: password hashing, session tokens, cookies and the
//! request extractor.

pub mod cookie;
pub mod extract;
pub mod password;
pub mod session;

pub use extract::RequireUser;
pub use password::{PasswordHasher, PasswordParams};
pub use session::{SessionAuthority, SessionClaims};
