//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Password strength estimation (zxcvbn)
//! - Signed bearer tokens (HS256 JWT)
//! - Bearer header transport and client identification
//! - Random secret generation

pub mod bearer;
pub mod client;
pub mod crypto;
pub mod password;
pub mod strength;
pub mod token;
