// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core trait definitions, error types, and common types for the Corvid
//! bot runtime.
//!
//! Everything that crosses a crate boundary lives here: the [`Transport`]
//! seam the runtime consumes, the [`HealthSource`] seam observability
//! consumers read from, the shared identifier newtypes, and the
//! [`CorvidError`] error enum.

pub mod error;
pub mod traits;
pub mod types;

pub use error::CorvidError;
pub use traits::observability::HealthSource;
pub use traits::transport::Transport;
