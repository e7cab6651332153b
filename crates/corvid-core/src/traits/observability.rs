// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observability seam for connection health reporting.

use crate::types::HealthSnapshot;

/// Source of connection health telemetry.
///
/// Implemented by the lifecycle supervisor; consumed by anything that wants
/// to report health (the `status` command, the serve loop's logs) without
/// depending on the supervisor itself.
pub trait HealthSource: Send + Sync {
    /// Computes a point-in-time health snapshot.
    fn snapshot(&self) -> HealthSnapshot;
}
