//! Library crate for album-theme-back, exposing modules for binaries and integration tests.

/// Color math: HCT conversion, seed extraction, tonal palettes and schemes.
pub mod color;
/// Runtime configuration loading.
pub mod config;
/// Image references and the decode primitive.
pub mod decode;
/// Request and response payloads exchanged over HTTP and SSE.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum routers.
pub mod routes;
/// Service layer between routes and the theme pipeline.
pub mod services;
/// Shared application state.
pub mod state;
/// Theme controller, request state machine and presentation layer.
pub mod theme;
