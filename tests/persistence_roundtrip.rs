use std::cell::RefCell;
use std::rc::Rc;

use egui::{Color32, Pos2, Rect, Vec2};
use inkbook::decoder::decode_payload;
use inkbook::document::Document;
use inkbook::element::{
    Drawable, Image, LineKind, Shape, ShapeKind, ShapeStyle, Stroke, StrokePoint, StrokeStyle,
};
use inkbook::engine::CanvasEngine;
use inkbook::persistence::{
    self, DebouncedSaver, DocumentData, MemoryNoteStore, NoteStore,
};
use inkbook::util::time;
use uuid::Uuid;

fn tiny_png() -> Vec<u8> {
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;
    let rgba: Vec<u8> = vec![
        255, 0, 0, 255, /* */ 0, 255, 0, 255, //
        0, 0, 255, 255, /* */ 255, 255, 255, 255,
    ];
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&rgba, 2, 2, image::ExtendedColorType::Rgba8)
        .unwrap();
    out
}

fn fountain_style() -> StrokeStyle {
    StrokeStyle {
        color: Color32::from_rgb(25, 35, 60),
        kind: LineKind::Fountain,
        thickness: 3.5,
        opacity: 0.9,
    }
}

fn build_document(note_id: Uuid) -> Document {
    let mut doc = Document::new(note_id);
    doc.add_page();
    let origin = doc.pages()[0].origin();

    let points = vec![
        StrokePoint::new(Pos2::new(origin.x + 10.0, 10.0), 0.25),
        StrokePoint::new(Pos2::new(origin.x + 20.0, 20.0), 0.5),
        StrokePoint::new(Pos2::new(origin.x + 30.0, 10.0), 1.0),
    ];
    doc.commit(Drawable::Stroke(Stroke::new(1, points, fountain_style())));

    let mut shape = Shape::new(
        2,
        ShapeKind::Parallelogram,
        Rect::from_min_size(Pos2::new(-100.0, 300.0), Vec2::new(150.0, 90.0)),
        ShapeStyle {
            color: Color32::from_rgb(120, 40, 40),
            thickness: 2.5,
        },
    );
    shape.set_rotation(0.6);
    doc.commit(Drawable::Shape(shape));

    let mut image = Image::new(
        3,
        Rect::from_min_size(Pos2::new(-60.0, 500.0), Vec2::new(120.0, 80.0)),
        tiny_png(),
    );
    image.set_rotation(-0.3);
    doc.commit(Drawable::Image(image));

    doc
}

#[test]
fn test_serialize_deserialize_reproduces_document() {
    let note_id = Uuid::new_v4();
    let doc = build_document(note_id);

    let json = persistence::serialize_document(&doc).unwrap();
    let mut store = MemoryNoteStore::new();
    store.put(note_id, &json).unwrap();
    let (restored, pending, status) = persistence::load_document(&store, note_id);

    assert!(status.is_none());
    assert_eq!(restored.pages().len(), doc.pages().len());
    for (a, b) in doc.pages().iter().zip(restored.pages()) {
        assert_eq!(a.size(), b.size());
        assert_eq!(a.ruling(), b.ruling());
        assert_eq!(a.origin(), b.origin());
        assert_eq!(a.drawables().len(), b.drawables().len());
    }

    // stroke comes back with exact samples and style
    let Drawable::Stroke(original) = &doc.pages()[0].drawables()[0] else {
        panic!("expected a stroke");
    };
    let Drawable::Stroke(stroke) = &restored.pages()[0].drawables()[0] else {
        panic!("expected a stroke");
    };
    assert_eq!(original.points(), stroke.points());
    assert_eq!(original.style(), stroke.style());

    let Drawable::Shape(shape) = &restored.pages()[0].drawables()[1] else {
        panic!("expected a shape");
    };
    assert_eq!(shape.kind(), ShapeKind::Parallelogram);
    assert_eq!(shape.gbox().rotation, 0.6);

    // the image's pixels are pending an async decode; its payload decodes
    // to the same pixel data as the original
    let Drawable::Image(image) = &restored.pages()[0].drawables()[2] else {
        panic!("expected an image");
    };
    assert_eq!(image.gbox().rotation, -0.3);
    assert!(image.pixels().is_none());
    assert_eq!(pending.len(), 1);
    assert_eq!(
        decode_payload(image.payload()).unwrap(),
        decode_payload(&tiny_png()).unwrap()
    );
}

#[test]
fn test_load_of_empty_store_yields_single_empty_page() {
    let store = MemoryNoteStore::new();
    let (doc, pending, status) = persistence::load_document(&store, Uuid::new_v4());
    assert!(status.is_none());
    assert!(pending.is_empty());
    assert_eq!(doc.pages().len(), 1);
    assert!(doc.pages()[0].drawables().is_empty());
}

#[test]
fn test_malformed_content_falls_back_with_status() {
    let note_id = Uuid::new_v4();
    let mut store = MemoryNoteStore::new();
    store.put(note_id, "{definitely not json").unwrap();
    let (doc, _, status) = persistence::load_document(&store, note_id);
    assert!(status.is_some());
    assert_eq!(doc.pages().len(), 1);
}

#[test]
fn test_debounce_collapses_a_burst() {
    let mut saver = DebouncedSaver::new(0.5);
    assert!(!saver.poll(10.0));

    saver.mark(10.0);
    assert!(!saver.poll(10.2));
    saver.mark(10.3);
    // the second mark pushed the deadline out
    assert!(!saver.poll(10.7));
    assert!(saver.poll(10.9));
    // fires exactly once
    assert!(!saver.poll(11.0));
    assert!(!saver.is_pending());
}

#[test]
fn test_burst_of_mutations_writes_once_with_final_state() {
    let store = Rc::new(RefCell::new(MemoryNoteStore::new()));
    let note_id = Uuid::new_v4();
    let mut engine = CanvasEngine::load(Box::new(store.clone()), note_id);

    for i in 0..3 {
        let y = 100.0 + i as f32 * 50.0;
        engine.pointer_down(Pos2::new(0.0, y), None);
        engine.pointer_move(Pos2::new(40.0, y + 10.0), None);
        engine.pointer_up(Pos2::new(40.0, y + 10.0), None);
    }
    assert_eq!(store.borrow().writes, 0);

    engine.tick_at(time::current_time_secs() + 60.0);
    assert_eq!(store.borrow().writes, 1);

    // the write reflects the state after the last mutation
    let content = store.borrow().get(note_id).unwrap().unwrap();
    let data: DocumentData = serde_json::from_str(&content).unwrap();
    assert_eq!(data.pages[0].drawables.len(), 3);

    // nothing left pending
    engine.tick_at(time::current_time_secs() + 120.0);
    assert_eq!(store.borrow().writes, 1);
}

#[test]
fn test_end_to_end_save_and_reload() {
    let store = Rc::new(RefCell::new(MemoryNoteStore::new()));
    let note_id = Uuid::new_v4();

    let mut engine = CanvasEngine::load(Box::new(store.clone()), note_id);
    engine.add_page();
    let origin = engine.document().pages()[1].origin();
    let p = |x: f32, y: f32| Pos2::new(origin.x + x, origin.y + y);

    engine.pointer_down(p(10.0, 10.0), None);
    engine.pointer_move(p(20.0, 20.0), None);
    engine.pointer_move(p(30.0, 10.0), None);
    engine.pointer_up(p(30.0, 10.0), None);

    engine.tick_at(time::current_time_secs() + 60.0);
    assert_eq!(store.borrow().writes, 1);

    let reloaded = CanvasEngine::load(Box::new(store.clone()), note_id);
    let pages = reloaded.document().pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].drawables().len(), 1);
    let Drawable::Stroke(stroke) = &pages[1].drawables()[0] else {
        panic!("expected a stroke");
    };
    assert_eq!(stroke.points().len(), 3);
    assert_eq!(stroke.points()[0].pos, Pos2::new(10.0, 10.0));
    assert_eq!(stroke.points()[1].pos, Pos2::new(20.0, 20.0));
    assert_eq!(stroke.points()[2].pos, Pos2::new(30.0, 10.0));
}

#[test]
fn test_image_import_becomes_adjustable_floating_object() {
    let store = Rc::new(RefCell::new(MemoryNoteStore::new()));
    let mut engine = CanvasEngine::load(Box::new(store.clone()), Uuid::new_v4());
    engine.set_view_rect(Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)));

    engine.import_image(tiny_png());
    // decode happens off-thread; drain completions with a bounded wait
    for _ in 0..200 {
        engine.tick();
        if engine.floating().is_some() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    let floating = engine.floating().expect("decoded image should float");
    let rect = floating.bounding_rect();
    // default width 300, square source keeps a square aspect
    assert_eq!(rect.size(), Vec2::new(300.0, 300.0));
    assert_eq!(rect.center(), Pos2::new(400.0, 300.0));
    assert_eq!(engine.tools().active().name(), "manipulate");

    engine.commit_floating();
    let Drawable::Image(image) = &engine.document().pages()[0].drawables()[0] else {
        panic!("expected an image");
    };
    assert!(image.pixels().is_some());
}

#[test]
fn test_failed_decode_never_realizes_an_image() {
    let store = Rc::new(RefCell::new(MemoryNoteStore::new()));
    let mut engine = CanvasEngine::load(Box::new(store.clone()), Uuid::new_v4());
    engine.import_image(b"this is not an image".to_vec());

    for _ in 0..20 {
        engine.tick();
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert!(engine.floating().is_none());
    assert_eq!(
        engine
            .document()
            .pages()
            .iter()
            .map(|p| p.drawables().len())
            .sum::<usize>(),
        0
    );
}
