use std::f32::consts::FRAC_PI_2;

use egui::{Pos2, Rect, Vec2};
use inkbook::element::{Drawable, ShapeKind};
use inkbook::engine::CanvasEngine;
use inkbook::guide::Guide;
use inkbook::persistence::MemoryNoteStore;
use inkbook::tool::{DefineShapeTool, EraserTool, LaserTool, ToolType};
use uuid::Uuid;

fn new_engine() -> CanvasEngine {
    let mut engine = CanvasEngine::load(Box::new(MemoryNoteStore::new()), Uuid::new_v4());
    engine.set_view_rect(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)));
    engine
}

fn drawable_count(engine: &CanvasEngine) -> usize {
    engine
        .document()
        .pages()
        .iter()
        .map(|p| p.drawables().len())
        .sum()
}

#[test]
fn test_pen_lifecycle_commits_on_release() {
    let mut engine = new_engine();
    engine.pointer_down(Pos2::new(0.0, 100.0), None);
    engine.pointer_move(Pos2::new(10.0, 110.0), None);
    engine.pointer_move(Pos2::new(20.0, 100.0), None);
    engine.pointer_up(Pos2::new(20.0, 100.0), None);

    let page = &engine.document().pages()[0];
    assert_eq!(page.drawables().len(), 1);
    let Drawable::Stroke(stroke) = &page.drawables()[0] else {
        panic!("expected a stroke");
    };
    assert_eq!(stroke.points().len(), 3);
    // world (0, 100) lands page-local at (425, 100) on the centered page
    assert_eq!(stroke.points()[0].pos, Pos2::new(425.0, 100.0));
    assert!(engine.save_pending());
}

#[test]
fn test_single_point_press_leaves_no_mark() {
    let mut engine = new_engine();
    engine.pointer_down(Pos2::new(0.0, 100.0), None);
    engine.pointer_up(Pos2::new(0.0, 100.0), None);
    assert_eq!(drawable_count(&engine), 0);
}

#[test]
fn test_tool_switch_finishes_pen_gesture() {
    let mut engine = new_engine();
    engine.pointer_down(Pos2::new(0.0, 100.0), None);
    engine.pointer_move(Pos2::new(30.0, 130.0), None);
    // the outgoing handler's deactivation hook commits the stroke
    engine.set_tool(ToolType::Eraser(EraserTool::default()));
    assert_eq!(drawable_count(&engine), 1);
}

#[test]
fn test_eraser_commits_eraser_styled_strokes() {
    let mut engine = new_engine();
    engine.set_tool(ToolType::Eraser(EraserTool::default()));
    engine.pointer_down(Pos2::new(0.0, 100.0), None);
    engine.pointer_move(Pos2::new(40.0, 100.0), None);
    engine.pointer_up(Pos2::new(40.0, 100.0), None);

    let Drawable::Stroke(stroke) = &engine.document().pages()[0].drawables()[0] else {
        panic!("expected a stroke");
    };
    assert!(stroke.style().kind.is_eraser());
}

#[test]
fn test_laser_never_marks_and_never_saves() {
    let mut engine = new_engine();
    engine.set_tool(ToolType::Laser(LaserTool::default()));
    engine.pointer_down(Pos2::new(0.0, 100.0), None);
    engine.pointer_move(Pos2::new(50.0, 150.0), None);
    engine.pointer_up(Pos2::new(50.0, 150.0), None);
    assert_eq!(drawable_count(&engine), 0);
    assert!(!engine.save_pending());
}

#[test]
fn test_define_shape_floats_and_hands_off_to_manipulate() {
    let mut engine = new_engine();
    engine.set_tool(ToolType::DefineShape(DefineShapeTool::new(
        ShapeKind::Rectangle,
    )));
    engine.pointer_down(Pos2::new(100.0, 100.0), None);
    engine.pointer_move(Pos2::new(200.0, 180.0), None);
    engine.pointer_up(Pos2::new(200.0, 180.0), None);

    // nothing committed yet; the shape floats in the overlay
    assert_eq!(drawable_count(&engine), 0);
    let floating = engine.floating().expect("shape should float");
    assert_eq!(
        floating.bounding_rect(),
        Rect::from_min_max(Pos2::new(100.0, 100.0), Pos2::new(200.0, 180.0))
    );
    assert_eq!(engine.tools().active().name(), "manipulate");
}

#[test]
fn test_manipulate_translates_resizes_and_rotates() {
    let mut engine = new_engine();
    engine.set_tool(ToolType::DefineShape(DefineShapeTool::new(
        ShapeKind::Rectangle,
    )));
    engine.pointer_down(Pos2::new(100.0, 100.0), None);
    engine.pointer_move(Pos2::new(200.0, 180.0), None);
    engine.pointer_up(Pos2::new(200.0, 180.0), None);

    // drag the body: translate
    engine.pointer_down(Pos2::new(150.0, 140.0), None);
    engine.pointer_move(Pos2::new(170.0, 150.0), None);
    engine.pointer_up(Pos2::new(170.0, 150.0), None);
    let rect = engine.floating().unwrap().bounding_rect();
    assert_eq!(rect.min, Pos2::new(120.0, 110.0));
    assert_eq!(rect.max, Pos2::new(220.0, 190.0));

    // drag a corner handle: resize
    engine.pointer_down(Pos2::new(220.0, 190.0), None);
    engine.pointer_move(Pos2::new(240.0, 200.0), None);
    engine.pointer_up(Pos2::new(240.0, 200.0), None);
    let rect = engine.floating().unwrap().bounding_rect();
    assert_eq!(rect.max, Pos2::new(240.0, 200.0));

    // drag the rotation handle a quarter turn
    let center = engine.floating().unwrap().bounding_rect().center();
    let handle = Pos2::new(center.x, 110.0 - 30.0);
    engine.pointer_down(handle, None);
    engine.pointer_move(Pos2::new(center.x + 70.0, center.y), None);
    engine.pointer_up(Pos2::new(center.x + 70.0, center.y), None);
    let Some(Drawable::Shape(shape)) = engine.floating() else {
        panic!("expected a floating shape");
    };
    assert!((shape.gbox().rotation - FRAC_PI_2).abs() < 1e-3);
}

#[test]
fn test_manipulate_miss_is_a_noop() {
    let mut engine = new_engine();
    engine.set_tool(ToolType::DefineShape(DefineShapeTool::new(
        ShapeKind::Circle,
    )));
    engine.pointer_down(Pos2::new(100.0, 100.0), None);
    engine.pointer_move(Pos2::new(180.0, 160.0), None);
    engine.pointer_up(Pos2::new(180.0, 160.0), None);

    let before = engine.floating().unwrap().bounding_rect();
    // far away from the shape and its handles
    engine.pointer_down(Pos2::new(400.0, 500.0), None);
    engine.pointer_move(Pos2::new(420.0, 520.0), None);
    engine.pointer_up(Pos2::new(420.0, 520.0), None);
    assert_eq!(engine.floating().unwrap().bounding_rect(), before);
}

#[test]
fn test_commit_floating_places_shape_on_page() {
    let mut engine = new_engine();
    engine.set_tool(ToolType::DefineShape(DefineShapeTool::new(
        ShapeKind::Parallelogram,
    )));
    engine.pointer_down(Pos2::new(100.0, 100.0), None);
    engine.pointer_move(Pos2::new(200.0, 180.0), None);
    engine.pointer_up(Pos2::new(200.0, 180.0), None);

    engine.commit_floating();
    assert!(engine.floating().is_none());
    assert_eq!(engine.tools().active().name(), "pen");

    let page = &engine.document().pages()[0];
    assert_eq!(page.drawables().len(), 1);
    let Drawable::Shape(shape) = &page.drawables()[0] else {
        panic!("expected a shape");
    };
    // translated into page-local coordinates at commit
    assert_eq!(shape.gbox().rect.min, Pos2::new(525.0, 100.0));
    assert!(engine.save_pending());
}

#[test]
fn test_pen_snaps_to_active_ruler() {
    let mut engine = new_engine();
    // ruler centers on the view: world (400, 300), top edge y = 270
    engine.toggle_guide(Guide::ruler);
    assert!(engine.guide().is_some());

    engine.pointer_down(Pos2::new(300.0, 278.0), None);
    engine.pointer_move(Pos2::new(320.0, 285.0), None);
    engine.pointer_up(Pos2::new(320.0, 285.0), None);

    let Drawable::Stroke(stroke) = &engine.document().pages()[0].drawables()[0] else {
        panic!("expected a stroke");
    };
    // both samples pulled onto the ruler edge (page-local y is unchanged
    // because the page starts at world y = 0)
    assert_eq!(stroke.points()[0].pos, Pos2::new(725.0, 270.0));
    assert_eq!(stroke.points()[1].pos, Pos2::new(745.0, 270.0));
}

#[test]
fn test_guide_toggle_off() {
    let mut engine = new_engine();
    engine.toggle_guide(Guide::compass);
    assert!(engine.guide().is_some());
    engine.toggle_guide(Guide::compass);
    assert!(engine.guide().is_none());
}

#[test]
fn test_plain_scroll_auto_appends_near_document_end() {
    let mut engine = new_engine();
    assert_eq!(engine.document().pages().len(), 1);

    // scrolling away from the end appends nothing
    engine.scroll(Vec2::new(0.0, 100.0));
    assert_eq!(engine.document().pages().len(), 1);
    engine.scroll(Vec2::new(0.0, -100.0));
    assert_eq!(engine.document().pages().len(), 1);

    // page bottom (world 1100) comes within the append margin of the
    // 600px-tall viewport
    engine.scroll(Vec2::new(0.0, -250.0));
    assert_eq!(engine.document().pages().len(), 2);
}
