//! HTTP API 접근 계층.

pub mod auth;
pub mod client;
pub mod middleware;

pub use auth::{AuthApi, AuthResponse, Credentials, HttpAuthApi};
pub use client::{ApiClient, ApiClientBuilder, ResponseContext};
pub use middleware::{
    bearer_header, BearerAuth, ForceLogoutOnUnauthorized, RequestMiddleware, ResponseMiddleware,
    TraceRequests,
};
