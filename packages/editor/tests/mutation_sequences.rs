//! Tests for longer mutation sequences
//!
//! This tests:
//! - Slide move/delete chains and active-slide tracking
//! - Element duplicate, reorder and type-safety rules
//! - Undo/redo over a mixed sequence
//! - Document integrity after operations

use std::collections::HashSet;

use chrono::Utc;
use slidekit_editor::model::{
    Background, DesignPreset, Element, ElementKind, Rect, ShapeElement, ShapeKind, TextElement,
};
use slidekit_editor::{Document, ElementPatch, History, Layout, Mutation, MutationError, MutationOutcome};

fn doc_with_slides(count: usize) -> Document {
    let mut doc = Document::create_with_id("deck-seq".to_string(), "Seq.pptx", Layout::Blank, Utc::now());
    for index in 1..count {
        doc.apply(&Mutation::AddSlide {
            layout: "blank".to_string(),
            index,
        })
        .unwrap();
    }
    doc
}

fn shape(id: &str, x: f64, y: f64) -> Element {
    Element::new(
        id,
        Rect::new(x, y, 50.0, 50.0),
        ElementKind::Shape(ShapeElement::new(ShapeKind::Circle)),
    )
}

fn slide_ids(doc: &Document) -> Vec<String> {
    doc.slides().iter().map(|s| s.id.clone()).collect()
}

fn element_ids(doc: &Document) -> Vec<String> {
    doc.active_slide().content.iter().map(|e| e.id.clone()).collect()
}

#[test]
fn test_move_slide_is_a_permutation() {
    let mut doc = doc_with_slides(4);
    let before = slide_ids(&doc);

    doc.apply(&Mutation::MoveSlide { from: 0, to: 3 }).unwrap();
    let after = slide_ids(&doc);

    assert_eq!(after, vec![before[1].clone(), before[2].clone(), before[3].clone(), before[0].clone()]);
    let titles: Vec<&str> = doc.slides().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Slide 1", "Slide 2", "Slide 3", "Slide 4"]);
}

#[test]
fn test_move_slide_clamps_target_and_tracks_active() {
    let mut doc = doc_with_slides(3);
    doc.set_active_slide(0);
    let active = doc.active_slide().id.clone();

    doc.apply(&Mutation::MoveSlide { from: 0, to: 99 }).unwrap();

    assert_eq!(doc.slides()[2].id, active);
    assert_eq!(doc.active_slide_index(), 2);
}

#[test]
fn test_move_to_same_position_is_unchanged() {
    let mut doc = doc_with_slides(3);
    let version = doc.version;

    assert_eq!(doc.apply(&Mutation::MoveSlide { from: 1, to: 1 }).unwrap(), MutationOutcome::Unchanged);
    assert_eq!(doc.version, version);
}

#[test]
fn test_custom_titles_survive_renumbering() {
    let mut doc = doc_with_slides(3);
    doc.apply(&Mutation::SetSlideTitle {
        index: 1,
        title: "Agenda".to_string(),
    })
    .unwrap();

    doc.apply(&Mutation::DeleteSlide { index: 0 }).unwrap();
    let titles: Vec<&str> = doc.slides().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Agenda", "Slide 2"]);
}

#[test]
fn test_last_slide_cannot_be_deleted() {
    let mut doc = doc_with_slides(1);
    assert_eq!(doc.apply(&Mutation::DeleteSlide { index: 0 }).unwrap(), MutationOutcome::Unchanged);
    assert_eq!(doc.slides().len(), 1);
}

#[test]
fn test_deleting_active_last_slide_clamps() {
    let mut doc = doc_with_slides(3);
    assert_eq!(doc.active_slide_index(), 2);

    doc.apply(&Mutation::DeleteSlide { index: 2 }).unwrap();
    assert_eq!(doc.active_slide_index(), 1);
}

#[test]
fn test_out_of_range_index_is_rejected() {
    let mut doc = doc_with_slides(2);
    let err = doc.apply(&Mutation::DeleteSlide { index: 5 }).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_duplicate_gets_fresh_id_and_offset() {
    let mut doc = doc_with_slides(1);
    doc.apply(&Mutation::AddElement {
        element: shape("orig", 100.0, 100.0),
    })
    .unwrap();

    let mut seen = HashSet::new();
    seen.insert("orig".to_string());
    for _ in 0..3 {
        let outcome = doc
            .apply(&Mutation::DuplicateElement {
                element_id: "orig".to_string(),
            })
            .unwrap();
        let id = outcome.created_id().unwrap().to_string();
        assert!(seen.insert(id.clone()), "id {} reused", id);

        let copy = doc.active_slide().element(&id).unwrap();
        assert_eq!((copy.x, copy.y), (120.0, 120.0));
    }
    assert_eq!(doc.active_slide().content.len(), 4);
}

#[test]
fn test_duplicate_uses_configured_offset() {
    let mut doc = doc_with_slides(1).with_duplicate_offset(5.0);
    doc.apply(&Mutation::AddElement {
        element: shape("orig", 10.0, 10.0),
    })
    .unwrap();

    let outcome = doc
        .apply(&Mutation::DuplicateElement {
            element_id: "orig".to_string(),
        })
        .unwrap();
    let copy = doc.active_slide().element(outcome.created_id().unwrap()).unwrap();
    assert_eq!((copy.x, copy.y), (15.0, 15.0));
}

#[test]
fn test_z_order_operations() {
    let mut doc = doc_with_slides(1);
    for id in ["a", "b", "c"] {
        doc.apply(&Mutation::AddElement { element: shape(id, 0.0, 0.0) }).unwrap();
    }

    doc.apply(&Mutation::BringToFront {
        element_id: "a".to_string(),
    })
    .unwrap();
    assert_eq!(element_ids(&doc), vec!["b", "c", "a"]);

    doc.apply(&Mutation::SendToBack {
        element_id: "c".to_string(),
    })
    .unwrap();
    assert_eq!(element_ids(&doc), vec!["c", "b", "a"]);

    let outcome = doc
        .apply(&Mutation::BringToFront {
            element_id: "a".to_string(),
        })
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Unchanged);
}

#[test]
fn test_update_cannot_change_element_type() {
    let mut doc = doc_with_slides(1);
    doc.apply(&Mutation::AddElement { element: shape("s", 0.0, 0.0) }).unwrap();

    let err = Mutation::UpdateElement {
        element_id: "s".to_string(),
        patch: ElementPatch::payload(ElementKind::Text(TextElement::plain("nope", 12.0))),
    }
    .apply(&mut doc)
    .unwrap_err();

    assert!(matches!(err, MutationError::KindMismatch { from: "shape", to: "text", .. }));
}

#[test]
fn test_duplicate_explicit_id_is_rejected() {
    let mut doc = doc_with_slides(1);
    doc.apply(&Mutation::AddElement { element: shape("x", 0.0, 0.0) }).unwrap();

    let err = Mutation::AddElement { element: shape("x", 5.0, 5.0) }
        .apply(&mut doc)
        .unwrap_err();
    assert_eq!(err, MutationError::DuplicateElementId("x".to_string()));
}

#[test]
fn test_set_design_restyles_every_slide() {
    let mut doc = doc_with_slides(3);
    let midnight = DesignPreset::find("midnight").unwrap();

    doc.apply(&Mutation::SetDesign { design: midnight.clone() }).unwrap();
    assert!(doc.slides().iter().all(|s| s.background == Background::solid("#0f172a")));
    assert_eq!(doc.presentation().design, midnight);

    let outcome = doc.apply(&Mutation::SetDesign { design: midnight }).unwrap();
    assert_eq!(outcome, MutationOutcome::Unchanged);
}

#[test]
fn test_rename_requires_a_name() {
    let mut doc = doc_with_slides(1);
    assert!(doc
        .apply(&Mutation::RenameFile {
            file_name: "   ".to_string()
        })
        .is_err());

    doc.apply(&Mutation::RenameFile {
        file_name: "Final.pptx".to_string(),
    })
    .unwrap();
    assert_eq!(doc.presentation().file_name, "Final.pptx");
}

#[test]
fn test_undo_redo_over_mixed_sequence() {
    let mut doc = doc_with_slides(1);
    let mut history = History::new();
    history.seed(doc.slides().to_vec());

    let steps = vec![
        Mutation::AddElement { element: shape("a", 0.0, 0.0) },
        Mutation::AddSlide {
            layout: "title".to_string(),
            index: 1,
        },
        Mutation::MoveSlide { from: 1, to: 0 },
        Mutation::SetSlideTitle {
            index: 0,
            title: "Cover".to_string(),
        },
    ];

    let mut states = vec![doc.slides().to_vec()];
    for step in &steps {
        doc.apply(step).unwrap();
        history.commit(doc.slides());
        states.push(doc.slides().to_vec());
    }
    assert_eq!(history.len(), 5);

    for expected in states.iter().rev().skip(1) {
        let restored = history.undo().unwrap();
        history.finish_replay();
        assert_eq!(&restored, expected);
    }
    assert!(history.undo().is_none());

    for expected in states.iter().skip(1) {
        let restored = history.redo().unwrap();
        history.finish_replay();
        assert_eq!(&restored, expected);
    }
    assert!(history.redo().is_none());
}

#[test]
fn test_ids_stay_unique_across_slides() {
    let mut doc = doc_with_slides(3);
    for index in 0..3 {
        doc.set_active_slide(index);
        doc.apply(&Mutation::AddElement { element: shape("", 0.0, 0.0) }).unwrap();
        doc.apply(&Mutation::AddElement { element: shape("", 10.0, 10.0) }).unwrap();
    }

    let mut ids = HashSet::new();
    for slide in doc.slides() {
        assert!(ids.insert(slide.id.clone()));
        for element in &slide.content {
            assert!(ids.insert(element.id.clone()), "duplicate id {}", element.id);
        }
    }
}
