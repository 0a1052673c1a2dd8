//! Unit tests for icgroup configuration types.
//!
//! This module contains tests organised into:
//! - [`helpers`] - Shared fixtures and helper functions
//! - [`types_tests`] - Defaults and TOML deserialisation tests
//! - [`layer_precedence_tests`] - `MergeComposer` layer precedence tests
//! - [`cli_tests`] - clap parsing of the `icgroup` command line

mod cli_tests;
mod helpers;
