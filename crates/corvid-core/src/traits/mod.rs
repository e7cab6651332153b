// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams consumed and implemented across the runtime.

pub mod observability;
pub mod transport;
