// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Views over the simulated page. Each returns the messages produced by
//! buyer interaction; none of them mutate the page directly.

pub mod bump_box;
pub mod product_list;
