// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corvid - a connection-resilient conversational bot runtime.
//!
//! This crate wires the runtime together: configuration, moderation,
//! command dispatch, and connection supervision. Transport adapters are
//! separate crates; [`serve::run_serve`] accepts any [`corvid_core::Transport`].

pub mod serve;
