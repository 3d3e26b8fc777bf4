// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Event loop around the state machine: virtual clock, page setup and the
//! session that ties page, selector and row hider together.

pub mod scheduler;
pub mod selector;
pub mod session;

pub use scheduler::{Backoff, Scheduler};
pub use selector::{BumpSelector, SELECTOR_FLAG};
pub use session::{Install, Session};
