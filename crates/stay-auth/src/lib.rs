//! # stay-auth
//!
//! Authentication and authorization for Staybook.
//!
//! ## Features
//!
//! - HS256 access and refresh tokens
//! - Argon2 password hashing
//! - Identity service with session rotation
//! - Owner-or-admin permission checks

pub mod identity;
pub mod jwt;
pub mod password;
pub mod permissions;

pub use identity::{AuthError, AuthSession, AuthUser, IdentityService, TokenPair, TokenSettings};
pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService, TokenKind};
pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
pub use permissions::CurrentUser;
