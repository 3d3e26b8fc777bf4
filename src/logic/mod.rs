// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Page-facing selector logic: lookups, builders and the row hiders.

pub mod dropdown;
pub mod guard;
pub mod hidden;
pub mod lookup;
pub mod normalize;
pub mod projection;
pub mod resolver;
pub mod row_hider;

pub use hidden::{extract_hidden_products, hide_product_rows};
pub use lookup::product_label;
pub use normalize::normalize;
pub use projection::project;
pub use resolver::resolve_container;
pub use row_hider::RowHider;
