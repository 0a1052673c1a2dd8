//! Create and manage IBM Containers groups from a delivery pipeline.
//!
//! `icgroup` turns a flat set of group options into the nested creation
//! document accepted by the containers REST API, submits it with the bearer
//! token of the local `cf` session, and offers the helpers a pipeline stage
//! needs around that: polling a group until it settles, removing it, and
//! reading service credentials from the targeted space.
//!
//! # Modules
//!
//! - [`request`]: Pure construction of the creation document
//! - [`platform`]: `cf` CLI adapters (credentials, endpoints, groups, services)
//! - [`submit`]: HTTP submission and the rejection policy
//! - [`api`]: One orchestration function per CLI command
//! - [`harness`]: Assertions over inspected group documents for acceptance tests
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`logging`]: Tracing subscriber installation
//! - [`error`]: Semantic error types for the application

pub mod api;
pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod platform;
pub mod request;
pub mod submit;
