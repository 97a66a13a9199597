//! `astrovault-platform` -- REST client for the AstroVault backend.
//!
//! The backend is consumed as a black-box REST contract: bearer-token
//! authenticated JSON endpoints for the linkable entities plus one
//! multipart upload endpoint for the finished submission. Everything
//! upstream depends on the [`transport::PlatformTransport`] trait; the
//! [`http::HttpPlatform`] implementation is the only place `reqwest`
//! appears.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;

pub use auth::{AuthContext, CredentialStore, StaticCredentials};
pub use config::PlatformConfig;
pub use error::PlatformError;
pub use http::HttpPlatform;
pub use transport::PlatformTransport;
