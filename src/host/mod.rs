// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! The host side: an in-memory document and the checkout page built on it.

pub mod document;
pub mod page;
pub mod selector;

pub use document::{Document, Element, MutationRecord, NodeId};
pub use page::{CheckoutPage, HostFixture};
pub use selector::Selector;
