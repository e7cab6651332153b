// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Corvid integration tests.

mod envelope;
mod mock_transport;

pub use envelope::EnvelopeBuilder;
pub use mock_transport::{MockTransport, SentReaction, SentText};
