#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "inkbook",
        native_options,
        Box::new(|cc| Ok(Box::new(inkbook::NotebookApp::new(cc)))),
    )
}

// Trunk-style wasm builds drive the app through their own entry point.
#[cfg(target_arch = "wasm32")]
fn main() {}
