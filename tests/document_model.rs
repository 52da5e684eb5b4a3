use egui::{Color32, Pos2, Rect, Vec2};
use inkbook::document::{Document, PAGE_GAP};
use inkbook::element::{Drawable, Shape, ShapeKind, ShapeStyle, Stroke, StrokePoint, StrokeStyle};
use inkbook::CommitOutcome;
use uuid::Uuid;

fn new_document() -> Document {
    Document::new(Uuid::new_v4())
}

fn stroke_style() -> StrokeStyle {
    StrokeStyle {
        color: Color32::BLACK,
        kind: inkbook::element::LineKind::Ballpoint,
        thickness: 4.0,
        opacity: 1.0,
    }
}

fn stroke_at(points: &[(f32, f32)]) -> Drawable {
    let points = points
        .iter()
        .map(|(x, y)| StrokePoint::new(Pos2::new(*x, *y), 1.0))
        .collect();
    Drawable::Stroke(Stroke::new(1, points, stroke_style()))
}

#[test]
fn test_new_document_has_one_page() {
    let doc = new_document();
    assert_eq!(doc.pages().len(), 1);
    // first page sits at the top, horizontally centered about x = 0
    let page = &doc.pages()[0];
    assert_eq!(page.origin().y, 0.0);
    assert_eq!(page.origin().x, -page.size().x / 2.0);
}

#[test]
fn test_page_positions_increase_with_constant_gap() {
    let mut doc = new_document();
    doc.add_page();
    doc.add_page();
    doc.insert_page_after(1);
    doc.tear_page(2);
    doc.insert_page_after(0);
    doc.recalculate_page_positions();

    let pages = doc.pages();
    assert!(pages.len() >= 3);
    for pair in pages.windows(2) {
        let bottom = pair[0].origin().y + pair[0].size().y;
        let next_top = pair[1].origin().y;
        // strictly increasing, no overlap, constant gap
        assert!(next_top > pair[0].origin().y);
        assert_eq!(next_top - bottom, PAGE_GAP);
    }
}

#[test]
fn test_recalculate_is_idempotent() {
    let mut doc = new_document();
    doc.add_page();
    doc.add_page();
    let before: Vec<Pos2> = doc.pages().iter().map(|p| p.origin()).collect();
    doc.recalculate_page_positions();
    doc.recalculate_page_positions();
    let after: Vec<Pos2> = doc.pages().iter().map(|p| p.origin()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_commit_translates_by_page_origin() {
    let mut doc = new_document();
    doc.add_page();
    let origin = doc.pages()[1].origin();

    // world coordinates that land on the second page
    let world = [
        (origin.x + 10.0, origin.y + 10.0),
        (origin.x + 20.0, origin.y + 20.0),
        (origin.x + 30.0, origin.y + 10.0),
    ];
    let outcome = doc.commit(stroke_at(&world));
    assert!(outcome.is_committed());

    assert!(doc.pages()[0].drawables().is_empty());
    let drawables = doc.pages()[1].drawables();
    assert_eq!(drawables.len(), 1);
    let Drawable::Stroke(stroke) = &drawables[0] else {
        panic!("expected a stroke");
    };
    // translated by exactly the page origin
    assert_eq!(stroke.points()[0].pos, Pos2::new(10.0, 10.0));
    assert_eq!(stroke.points()[1].pos, Pos2::new(20.0, 20.0));
    assert_eq!(stroke.points()[2].pos, Pos2::new(30.0, 10.0));
}

#[test]
fn test_commit_miss_is_silent_noop() {
    let mut doc = new_document();
    // far to the right of the (centered) page
    let outcome = doc.commit(stroke_at(&[(5000.0, 50.0), (5010.0, 60.0)]));
    assert_eq!(outcome, CommitOutcome::Miss);
    assert!(doc.pages()[0].drawables().is_empty());
}

#[test]
fn test_commit_drops_short_strokes() {
    let mut doc = new_document();
    let outcome = doc.commit(stroke_at(&[(10.0, 10.0)]));
    assert_eq!(outcome, CommitOutcome::Discarded);
    let outcome = doc.commit(stroke_at(&[]));
    assert_eq!(outcome, CommitOutcome::Discarded);
    assert!(doc.pages()[0].drawables().is_empty());
}

#[test]
fn test_commit_shape_anchors_at_center() {
    let mut doc = new_document();
    let origin = doc.pages()[0].origin();
    let rect = Rect::from_min_size(Pos2::new(origin.x + 100.0, origin.y + 200.0), Vec2::new(80.0, 60.0));
    let shape = Shape::new(7, ShapeKind::Rectangle, rect, ShapeStyle::default());
    assert!(doc.commit(Drawable::Shape(shape)).is_committed());

    let Drawable::Shape(committed) = &doc.pages()[0].drawables()[0] else {
        panic!("expected a shape");
    };
    assert_eq!(committed.gbox().rect.min, Pos2::new(100.0, 200.0));
}

#[test]
fn test_tear_page_keeps_document_non_empty() {
    let mut doc = new_document();
    doc.add_page();
    doc.tear_page(0);
    assert_eq!(doc.pages().len(), 1);

    // tearing the last page replaces it with a fresh one
    doc.tear_page(0);
    assert_eq!(doc.pages().len(), 1);
    assert!(doc.pages()[0].drawables().is_empty());
    assert_eq!(doc.pages()[0].origin().y, 0.0);
}

#[test]
fn test_page_at_first_match_wins() {
    let mut doc = new_document();
    doc.add_page();
    let p0 = doc.pages()[0].rect().center();
    let p1 = doc.pages()[1].rect().center();
    assert_eq!(doc.page_at(p0), Some(0));
    assert_eq!(doc.page_at(p1), Some(1));
    // the gap between pages belongs to nobody
    let gap = Pos2::new(0.0, doc.pages()[0].rect().max.y + PAGE_GAP / 2.0);
    assert_eq!(doc.page_at(gap), None);
}

#[test]
fn test_commit_invalidates_only_owning_page_cache() {
    let mut doc = new_document();
    doc.add_page();
    for page in doc.pages_mut() {
        page.rebuild_cache();
        assert!(!page.cache().is_dirty());
    }

    let origin = doc.pages()[1].origin();
    doc.commit(stroke_at(&[
        (origin.x + 10.0, origin.y + 10.0),
        (origin.x + 40.0, origin.y + 40.0),
    ]));
    assert!(!doc.pages()[0].cache().is_dirty());
    assert!(doc.pages()[1].cache().is_dirty());
}
