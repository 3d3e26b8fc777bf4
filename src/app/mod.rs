// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Desktop preview entry point wiring egui/eframe to the simulated page.

use std::path::PathBuf;

use eframe::egui;
use egui_phosphor::Variant;
use serde_json::Value;

use crate::host::HostFixture;
use crate::ui::BumpPreviewApp;

/// Open the preview window and run the egui event loop.
pub fn run(fixture: HostFixture, config: Value, config_path: Option<PathBuf>) -> eframe::Result<()> {
    // Register Phosphor icon font.
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, Variant::Regular);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([560.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bump Selector Preview",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(BumpPreviewApp::new(fixture, config, config_path)))
        }),
    )
}
