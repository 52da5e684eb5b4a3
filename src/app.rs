use egui::{Color32, Pos2};
use uuid::Uuid;

use crate::element::{LineKind, ShapeKind};
use crate::engine::CanvasEngine;
use crate::guide::Guide;
use crate::renderer::Renderer;
use crate::tool::{
    DefineShapeTool, EraserTool, LaserTool, ManipulateTarget, ManipulateTool, PenTool, ToolType,
};

/// Scroll-wheel-to-zoom sensitivity with the modifier held.
const ZOOM_PER_SCROLL_UNIT: f32 = 0.002;

/// The eframe shell around the canvas engine: translates egui input into
/// engine calls and draws the minimal surrounding chrome. The note
/// identity is the only state persisted through eframe itself.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct NotebookApp {
    note_id: Uuid,
    #[serde(skip)]
    engine: Option<CanvasEngine>,
    #[serde(skip)]
    renderer: Option<Renderer>,
    #[serde(skip)]
    pointer_active: bool,
    #[serde(skip)]
    last_pointer: Pos2,
}

impl Default for NotebookApp {
    fn default() -> Self {
        Self {
            note_id: Uuid::new_v4(),
            engine: None,
            renderer: None,
            pointer_active: false,
            last_pointer: Pos2::ZERO,
        }
    }
}

impl NotebookApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: NotebookApp = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        #[cfg(not(target_arch = "wasm32"))]
        let store = Box::new(crate::persistence::FileNoteStore::new("inkbook_notes"));
        #[cfg(target_arch = "wasm32")]
        let store = Box::new(crate::persistence::MemoryNoteStore::new());

        app.engine = Some(CanvasEngine::load(store, app.note_id));
        app.renderer = Some(Renderer::new(cc));
        app
    }

    fn toolbar(engine: &mut CanvasEngine, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let name = engine.tools().active().name();

            if ui.selectable_label(name == "pen", "✏ Pen").clicked() && name != "pen" {
                engine.set_tool(ToolType::Pen(PenTool::default()));
            }
            if ui.selectable_label(name == "eraser", "⌫ Eraser").clicked() && name != "eraser" {
                engine.set_tool(ToolType::Eraser(EraserTool::default()));
            }
            if ui.selectable_label(name == "laser", "● Laser").clicked() && name != "laser" {
                engine.set_tool(ToolType::Laser(LaserTool::default()));
            }

            ui.separator();

            for (label, kind) in [
                ("▭ Rect", ShapeKind::Rectangle),
                ("◯ Circle", ShapeKind::Circle),
                ("▱ Para", ShapeKind::Parallelogram),
            ] {
                let selected = matches!(
                    engine.tools().active(),
                    ToolType::DefineShape(t) if t.kind == kind
                );
                if ui.selectable_label(selected, label).clicked() && !selected {
                    engine.set_tool(ToolType::DefineShape(DefineShapeTool::new(kind)));
                }
            }

            ui.separator();

            if ui.button("Ruler").clicked() {
                engine.toggle_guide(Guide::ruler);
            }
            if ui.button("Set square").clicked() {
                engine.toggle_guide(Guide::set_square);
            }
            if ui.button("Compass").clicked() {
                engine.toggle_guide(Guide::compass);
            }
            if engine.guide().is_some() {
                let adjusting = matches!(
                    engine.tools().active(),
                    ToolType::Manipulate(t) if t.target() == ManipulateTarget::Guide
                );
                if ui.selectable_label(adjusting, "Adjust guide").clicked() && !adjusting {
                    engine.set_tool(ToolType::Manipulate(ManipulateTool::new(
                        ManipulateTarget::Guide,
                    )));
                }
            }

            ui.separator();

            if ui.button("Add page").clicked() {
                engine.add_page();
            }
            if ui.button("Tear last").clicked() {
                let last = engine.document().pages().len().saturating_sub(1);
                engine.tear_page(last);
            }

            if engine.floating().is_some() {
                ui.separator();
                if ui.button("Place (Enter)").clicked() {
                    engine.commit_floating();
                }
                if ui.button("Discard (Esc)").clicked() {
                    engine.drop_floating();
                }
            }
        });

        // style row for the active drawing tool
        if let ToolType::Pen(pen) = engine.active_tool_mut() {
            ui.horizontal(|ui| {
                ui.label("Color:");
                egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut pen.style.color,
                    egui::color_picker::Alpha::Opaque,
                );
                ui.label("Thickness:");
                ui.add(egui::Slider::new(&mut pen.style.thickness, 1.0..=12.0));
                for (label, kind) in [
                    ("Fountain", LineKind::Fountain),
                    ("Ballpoint", LineKind::Ballpoint),
                    ("Highlighter", LineKind::Highlighter),
                ] {
                    if ui.selectable_label(pen.style.kind == kind, label).clicked() {
                        pen.style.kind = kind;
                        pen.style.opacity = if kind == LineKind::Highlighter { 0.45 } else { 1.0 };
                    }
                }
            });
        }
    }

    fn handle_canvas_input(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.set_view_rect(response.rect);

        let (
            pointer_pos,
            primary_pressed,
            primary_down,
            primary_released,
            middle_down,
            pointer_delta,
            scroll,
            zoom_modifier,
            has_pointer,
        ) = ctx.input(|i| {
            (
                i.pointer.latest_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.middle_down(),
                i.pointer.delta(),
                i.raw_scroll_delta,
                i.modifiers.command || i.modifiers.ctrl,
                i.pointer.has_pointer(),
            )
        });

        let pos = pointer_pos.unwrap_or(self.last_pointer);
        if pointer_pos.is_some() {
            self.last_pointer = pos;
        }
        let over_canvas = response.rect.contains(pos);

        // the dedicated pan button overrides every tool
        if middle_down {
            engine.pan_by(pointer_delta);
        } else if primary_pressed && over_canvas {
            engine.pointer_down(pos, None);
            self.pointer_active = true;
        } else if primary_released && self.pointer_active {
            engine.pointer_up(pos, None);
            self.pointer_active = false;
        } else if primary_down && self.pointer_active && pointer_delta != egui::Vec2::ZERO {
            engine.pointer_move(pos, None);
        }

        // losing the pointer entirely also ends the gesture
        if self.pointer_active && !has_pointer {
            engine.pointer_up(self.last_pointer, None);
            self.pointer_active = false;
        }

        if scroll != egui::Vec2::ZERO && over_canvas {
            if zoom_modifier {
                engine.zoom_about(pos, (scroll.y * ZOOM_PER_SCROLL_UNIT).exp());
            } else {
                engine.scroll(scroll);
            }
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Enter) {
                engine.commit_floating();
            }
            if i.key_pressed(egui::Key::Escape) {
                engine.drop_floating();
            }
        });

        // dropped image files become floating images once decoded
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(bytes) = file.bytes {
                engine.import_image(bytes.to_vec());
            } else if let Some(path) = file.path {
                #[cfg(not(target_arch = "wasm32"))]
                match std::fs::read(&path) {
                    Ok(bytes) => engine.import_image(bytes),
                    Err(err) => log::error!("failed to read dropped file {}: {err}", path.display()),
                }
                #[cfg(target_arch = "wasm32")]
                log::warn!("file path access not supported on wasm: {}", path.display());
            }
        }
    }
}

impl eframe::App for NotebookApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.engine.is_none() {
            return;
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if let Some(engine) = self.engine.as_mut() {
                Self::toolbar(engine, ui);
            }
        });

        if let Some(status) = self.engine.as_ref().and_then(|e| e.status()).cloned() {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                let color = if status.error {
                    Color32::from_rgb(220, 80, 80)
                } else {
                    ui.visuals().text_color()
                };
                ui.colored_label(color, status.text);
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

            self.handle_canvas_input(ctx, &response);

            if let Some(engine) = self.engine.as_mut() {
                engine.tick();
                if let Some(renderer) = self.renderer.as_mut() {
                    engine.render(renderer, &painter);
                }
            }
        });
    }
}
