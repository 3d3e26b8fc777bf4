// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Quantity/variant dropdowns for checkout order bumps.
//!
//! A bump offer on a hosted order form only knows one product. This crate
//! turns each configured bump into a dropdown of related products, keeps
//! exactly one of them in the order, survives the host re-rendering the form
//! when the buyer switches main product, and blocks submission while an
//! enabled bump has nothing selected.

pub mod app;
pub mod host;
pub mod logic;
pub mod models;
pub mod mvu;
pub mod runtime;
pub mod ui;
pub mod utils;
