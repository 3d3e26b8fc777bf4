// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain models shared by the selector logic and the preview.

pub mod bump;
pub mod config;
pub mod snapshot;

pub use bump::{Bump, BumpElements, BumpOption, BumpState};
pub use config::{BumpConfig, ConfigError, PageConfig, Timings};
pub use snapshot::{SelectionSnapshot, SnapshotSet};
