// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by the document model and the builders.

pub mod escape;

/// Escape element text content.
pub use escape::escape_html;
/// Escape a double-quoted attribute value.
pub use escape::escape_html_attr;
