// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command registry, cooldown gating, and dispatch for the Corvid bot
//! runtime.
//!
//! The [`CommandRegistry`] is built once at startup and read-only afterwards.
//! The [`Dispatcher`] walks each invocation through the gate chain --
//! lookup, owner scope, group scope, cooldown -- then runs the command body
//! with its errors contained at the dispatch boundary.

pub mod builtin;
pub mod cooldown;
pub mod dispatcher;
pub mod registry;

pub use cooldown::{CooldownDecision, CooldownGate};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use registry::{Command, CommandRegistry, DispatchContext};
