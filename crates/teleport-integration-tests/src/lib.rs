//! Cross-crate integration tests for the Teleport workspace.
//!
//! The actual tests live in `tests/`; this crate exists only to anchor
//! them in the workspace.
