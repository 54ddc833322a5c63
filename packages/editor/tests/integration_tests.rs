//! End-to-end editing session tests
//!
//! Drives an `EditSession` through the same event sequences a host UI
//! produces and checks history, thumbnails, autosave and export.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use slidekit_common::{CommonError, CommonResult, RecentItem};
use slidekit_editor::chart::CHART_PALETTE;
use slidekit_editor::hash::digest;
use slidekit_editor::interaction::{ChosenImage, Key, Modifiers};
use slidekit_editor::model::{
    ChartType, DesignPreset, Element, ElementKind, Point, Rect, ShapeElement, ShapeKind, Slide, TextElement,
};
use slidekit_editor::thumbnail::{CaptureError, CaptureOutcome, CaptureRequest, ThumbnailImage};
use slidekit_editor::{
    CommitOutcome, Document, EditSession, EditorConfig, ElementPatch, ExportEncoder, ExportError,
    FileStorage, InsertTool, InteractionState, JsonExportEncoder, Layout, LoadOutcome,
    MemoryStorage, Mutation, MutationOutcome, SaveOutcome, SnapshotRenderer, Storage,
};

const MS: Duration = Duration::from_millis(1);

#[derive(Default)]
struct RecordingRenderer {
    captured: Vec<String>,
}

impl SnapshotRenderer for RecordingRenderer {
    fn capture(&mut self, request: &CaptureRequest) -> Result<ThumbnailImage, CaptureError> {
        assert!(request.exclude_chrome);
        self.captured.push(request.slide.id.clone());
        Ok(ThumbnailImage {
            width: 960,
            height: 540,
            mime: "image/png".to_string(),
            bytes: request.content_hash.to_le_bytes().to_vec(),
        })
    }
}

struct BrokenEncoder;

impl ExportEncoder for BrokenEncoder {
    fn encode(&mut self, _slides: &[Slide], _file_name: &str) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::Encode("font table missing".to_string()))
    }
}

/// Storage whose writes always fail
struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn load<T: DeserializeOwned>(&self, _id: &str) -> CommonResult<Option<T>> {
        Ok(None)
    }

    fn save<T: Serialize>(&mut self, _id: &str, _value: &T) -> CommonResult<()> {
        Err(CommonError::Generic("disk is read-only".to_string()))
    }

    fn delete(&mut self, _id: &str) -> CommonResult<()> {
        Ok(())
    }

    fn recent(&self) -> CommonResult<Vec<RecentItem>> {
        Ok(Vec::new())
    }

    fn touch_recent(&mut self, _item: RecentItem) -> CommonResult<()> {
        Ok(())
    }

    fn remove_recent(&mut self, _id: &str) -> CommonResult<()> {
        Ok(())
    }
}

fn session(layout: Layout) -> EditSession {
    let doc = Document::create_with_id("deck-test".to_string(), "Review.pptx", layout, Utc::now());
    EditSession::new(doc, EditorConfig::default())
}

fn shape_at(x: f64, y: f64) -> Element {
    Element::new(
        "",
        Rect::new(x, y, 100.0, 80.0),
        ElementKind::Shape(ShapeElement::new(ShapeKind::Rectangle)),
    )
}

fn add(session: &mut EditSession, element: Element, now: Instant) -> String {
    match session.apply(&Mutation::AddElement { element }, now).unwrap() {
        MutationOutcome::Created { id } => id,
        other => panic!("expected created element, got {:?}", other),
    }
}

fn titles(slides: &[Slide]) -> Vec<&str> {
    slides.iter().map(|s| s.title.as_str()).collect()
}

#[test]
fn test_add_slides_renumbers_titles() {
    let t0 = Instant::now();
    let mut session = session(Layout::Title);

    for _ in 0..3 {
        session
            .apply(
                &Mutation::AddSlide {
                    layout: "title".to_string(),
                    index: 1,
                },
                t0,
            )
            .unwrap();
    }

    let slides = session.document().slides();
    assert_eq!(slides.len(), 4);
    assert_eq!(titles(slides), vec!["Slide 1", "Slide 2", "Slide 3", "Slide 4"]);
}

#[test]
fn test_delete_before_active_shifts_active() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    for index in [1, 2] {
        session
            .apply(
                &Mutation::AddSlide {
                    layout: "blank".to_string(),
                    index,
                },
                t0,
            )
            .unwrap();
    }
    assert_eq!(session.document().active_slide_index(), 2);
    let active_id = session.document().active_slide().id.clone();

    session.apply(&Mutation::DeleteSlide { index: 1 }, t0).unwrap();

    assert_eq!(session.document().slides().len(), 2);
    assert_eq!(session.document().active_slide_index(), 1);
    assert_eq!(session.document().active_slide().id, active_id);
}

#[test]
fn test_identical_update_adds_no_history() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    let id = add(
        &mut session,
        Element::new("", Rect::new(0.0, 0.0, 200.0, 40.0), ElementKind::Text(TextElement::plain("Hi", 24.0))),
        t0,
    );

    let update = Mutation::UpdateElement {
        element_id: id,
        patch: ElementPatch::position(10.0, 10.0),
    };
    session.apply(&update, t0).unwrap();
    let entries = session.history().len();

    assert_eq!(session.apply(&update, t0).unwrap(), MutationOutcome::Unchanged);
    assert_eq!(session.history().len(), entries);
}

#[test]
fn test_drag_commits_one_entry_after_settle() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    let mut storage = MemoryStorage::new();
    let mut renderer = RecordingRenderer::default();
    let id = add(&mut session, shape_at(100.0, 100.0), t0);
    let before = session.history().len();

    session.pointer_down(Point::new(150.0, 140.0), t0).unwrap();
    session.drag_start(&id);
    for i in 0..50 {
        session.drag_move(Point::new(100.0 + i as f64 * 4.0, 100.0 + i as f64));
    }
    let t1 = t0 + Duration::from_secs(1);
    session.drag_stop(Point::new(300.4, 149.6), t1).unwrap();

    assert_eq!(session.history().len(), before);
    assert!(session.is_history_pending());

    let report = session.tick(t1 + 199 * MS, &mut storage, &mut renderer);
    assert_eq!(report.history, None);

    let report = session.tick(t1 + 200 * MS, &mut storage, &mut renderer);
    assert_eq!(report.history, Some(CommitOutcome::Committed));
    assert_eq!(session.history().len(), before + 1);

    let committed = session.history().current().unwrap().slides()[0].element(&id).unwrap();
    assert_eq!((committed.x, committed.y), (300.0, 150.0));
}

#[test]
fn test_drag_back_to_origin_adds_no_history() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    let mut storage = MemoryStorage::new();
    let mut renderer = RecordingRenderer::default();
    let id = add(&mut session, shape_at(100.0, 100.0), t0);
    let before = session.history().len();

    session.drag_start(&id);
    session.drag_move(Point::new(400.0, 400.0));
    session.drag_stop(Point::new(100.0, 100.0), t0).unwrap();
    session.tick(t0 + Duration::from_secs(1), &mut storage, &mut renderer);

    assert_eq!(session.history().len(), before);
}

#[test]
fn test_inserted_bar_chart_uses_default_data() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);

    session.select_tool(InsertTool::Chart(ChartType::Bar), false);
    session.pointer_down(Point::new(480.0, 270.0), t0).unwrap();

    let element = session.document().active_slide().content.last().unwrap().clone();
    let chart = match &element.kind {
        ElementKind::Chart(chart) => chart,
        other => panic!("expected chart, got {:?}", other),
    };
    assert_eq!(chart.chart_data.labels, vec!["Q1", "Q2", "Q3", "Q4"]);
    let colors: Vec<&str> = chart.chart_data.datasets.iter().map(|d| d.color.as_str()).collect();
    assert_eq!(colors, CHART_PALETTE[..3].to_vec());

    assert_eq!(session.controller().selected_id(), Some(element.id.as_str()));
    assert!(session.toolbar().is_some());
}

#[test]
fn test_undo_redo_round_trip_clears_selection() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    let original = session.document().slides().to_vec();
    let id = add(&mut session, shape_at(100.0, 100.0), t0);
    let edited = session.document().slides().to_vec();

    session.pointer_down(Point::new(150.0, 140.0), t0).unwrap();
    assert!(session.toolbar().is_some());

    assert!(session.undo(t0));
    assert_eq!(session.document().slides(), original.as_slice());
    assert!(session.toolbar().is_none());
    assert_eq!(session.controller().state(), &InteractionState::Idle);
    assert!(!session.history().is_replaying());

    assert!(session.redo(t0));
    assert_eq!(session.document().slides(), edited.as_slice());
    assert!(session.document().active_slide().contains_element(&id));
    assert!(!session.redo(t0));
}

#[test]
fn test_history_capacity_is_bounded() {
    let t0 = Instant::now();
    let config = EditorConfig {
        history_capacity: 3,
        ..EditorConfig::default()
    };
    let doc = Document::create_with_id("deck-k".to_string(), "K.pptx", Layout::Blank, Utc::now());
    let mut session = EditSession::new(doc, config);

    for i in 0..5 {
        add(&mut session, shape_at(i as f64 * 10.0, 0.0), t0);
    }
    assert_eq!(session.history().len(), 3);

    assert!(session.undo(t0));
    assert!(session.undo(t0));
    assert!(!session.undo(t0));
    assert_eq!(session.document().active_slide().content.len(), 3);
}

#[test]
fn test_autosave_after_debounce_and_reopen() {
    let t0 = Instant::now();
    let mut session = session(Layout::TitleContent);
    let mut storage = MemoryStorage::new();
    let mut renderer = RecordingRenderer::default();

    add(&mut session, shape_at(10.0, 10.0), t0);
    add(&mut session, shape_at(20.0, 20.0), t0 + 300 * MS);

    let report = session.tick(t0 + 700 * MS, &mut storage, &mut renderer);
    assert_eq!(report.save, None);

    let report = session.tick(t0 + 1000 * MS, &mut storage, &mut renderer);
    assert_eq!(report.save, Some(SaveOutcome::Saved));
    assert!(!session.is_dirty());
    assert_eq!(storage.recent().unwrap()[0].name, "Review.pptx");

    let (reopened, outcome) = EditSession::open(&storage, "deck-test", EditorConfig::default()).unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(reopened.document().slides(), session.document().slides());
    assert_eq!(reopened.history().cursor(), session.history().cursor());
}

#[test]
fn test_thumbnail_captured_after_debounce() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    let mut storage = MemoryStorage::new();
    let mut renderer = RecordingRenderer::default();
    let slide_id = session.document().active_slide().id.clone();

    add(&mut session, shape_at(10.0, 10.0), t0);
    session.tick(t0 + 799 * MS, &mut storage, &mut renderer);
    assert!(renderer.captured.is_empty());

    let report = session.tick(t0 + 800 * MS, &mut storage, &mut renderer);
    assert_eq!(report.captures, vec![CaptureOutcome::Stored { slide_id: slide_id.clone() }]);
    assert!(session.thumbnails().thumbnail(&slide_id).is_some());
}

#[test]
fn test_image_insert_through_file_request() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);

    session.select_tool(InsertTool::Image, false);
    session.pointer_down(Point::new(480.0, 270.0), t0).unwrap();
    assert!(session.document().active_slide().content.is_empty());

    let slot = session.take_image_request().unwrap();
    let chosen = ChosenImage {
        src: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        data: None,
    };
    session.image_chosen(slot.token, Some(chosen), t0).unwrap();

    let content = &session.document().active_slide().content;
    assert_eq!(content.len(), 1);
    assert!(content[0].as_image().unwrap().src.is_some());
}

#[test]
fn test_delete_key_removes_selection() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    add(&mut session, shape_at(100.0, 100.0), t0);

    session.pointer_down(Point::new(150.0, 140.0), t0).unwrap();
    session.key_down(&Key::Delete, Modifiers::default(), t0).unwrap();

    assert!(session.document().active_slide().content.is_empty());
    assert!(session.toolbar().is_none());
}

#[test]
fn test_export_failure_becomes_notification() {
    let mut session = session(Layout::Title);
    let mut storage = MemoryStorage::new();

    assert!(session.export(&mut BrokenEncoder, &mut storage).is_err());
    assert_eq!(session.notifications().len(), 1);
    assert!(session.notifications()[0].message.contains("font table missing"));

    let id = session.notifications()[0].id;
    assert!(session.dismiss_notification(id));
    assert!(session.notifications().is_empty());

    let bytes = session.export(&mut JsonExportEncoder, &mut storage).unwrap();
    assert!(!bytes.is_empty());
}

#[test]
fn test_shutdown_flushes_pending_work() -> anyhow::Result<()> {
    let t0 = Instant::now();
    let dir = tempfile::tempdir()?;
    let mut storage = FileStorage::open(dir.path())?;

    let mut session = session(Layout::Blank);
    let id = add(&mut session, shape_at(100.0, 100.0), t0);
    session.drag_start(&id);
    session.drag_stop(Point::new(200.0, 200.0), t0)?;
    let before = session.history().len();

    assert_eq!(session.shutdown(&mut storage), SaveOutcome::Saved);
    assert_eq!(session.history().len(), before + 1);

    let (reopened, outcome) = EditSession::open(&storage, "deck-test", EditorConfig::default())?;
    assert_eq!(outcome, LoadOutcome::Loaded);
    let moved = reopened.document().active_slide().element(&id).unwrap();
    assert_eq!((moved.x, moved.y), (200.0, 200.0));
    Ok(())
}

#[test]
fn test_open_unknown_id_starts_fresh() {
    let storage = MemoryStorage::new();
    let (session, outcome) = EditSession::open(&storage, "missing", EditorConfig::default()).unwrap();

    assert_eq!(outcome, LoadOutcome::Fresh);
    assert_eq!(session.document().slides().len(), 1);
    assert!(!session.history().can_undo());
}

#[test]
fn test_undo_refreshes_thumbnail_of_inactive_slide() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    let mut storage = MemoryStorage::new();
    let mut renderer = RecordingRenderer::default();

    session
        .apply(
            &Mutation::AddSlide {
                layout: "blank".to_string(),
                index: 1,
            },
            t0,
        )
        .unwrap();
    session.tick(t0 + 1000 * MS, &mut storage, &mut renderer);

    session.set_active_slide(0);
    add(&mut session, shape_at(10.0, 10.0), t0 + 2000 * MS);
    session.tick(t0 + 3000 * MS, &mut storage, &mut renderer);

    let first = session.document().slides()[0].id.clone();
    let edited_hash = session.thumbnails().thumbnail(&first).unwrap().content_hash;

    session.set_active_slide(1);
    assert!(session.undo(t0 + 4000 * MS));
    assert_eq!(session.document().slides().len(), 2);
    assert_eq!(session.document().active_slide_index(), 1);
    session.tick(t0 + 10_000 * MS, &mut storage, &mut renderer);

    let live = digest(&session.document().slides()[0]);
    let cached = session.thumbnails().thumbnail(&first).unwrap().content_hash;
    assert_ne!(live, edited_hash);
    assert_eq!(cached, live);
}

#[test]
fn test_export_after_failed_save_notifies() {
    let t0 = Instant::now();
    let mut session = session(Layout::Title);
    add(&mut session, shape_at(10.0, 10.0), t0);

    let bytes = session.export(&mut JsonExportEncoder, &mut ReadOnlyStorage).unwrap();

    assert!(!bytes.is_empty());
    assert!(session.is_dirty());
    assert_eq!(session.notifications().len(), 1);
    assert!(session.notifications()[0].message.contains("disk is read-only"));
}

#[test]
fn test_undo_set_design_restores_preset_for_new_slides() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);
    let midnight = DesignPreset::find("midnight").unwrap();

    session.apply(&Mutation::SetDesign { design: midnight }, t0).unwrap();
    assert!(session.undo(t0));
    assert_eq!(session.document().presentation().design.id, "classic");

    assert!(session.redo(t0));
    assert_eq!(session.document().presentation().design.id, "midnight");

    assert!(session.undo(t0));
    session
        .apply(
            &Mutation::AddSlide {
                layout: "blank".to_string(),
                index: 1,
            },
            t0,
        )
        .unwrap();
    let added = &session.document().slides()[1];
    assert_eq!(added.background, DesignPreset::default().background());
}

#[test]
fn test_escape_drops_pending_image_request() {
    let t0 = Instant::now();
    let mut session = session(Layout::Blank);

    session.select_tool(InsertTool::Image, false);
    session.pointer_down(Point::new(480.0, 270.0), t0).unwrap();
    assert!(matches!(session.controller().state(), InteractionState::AwaitingImage { .. }));

    session.key_down(&Key::Escape, Modifiers::default(), t0).unwrap();

    assert_eq!(session.controller().state(), &InteractionState::Idle);
    assert!(session.take_image_request().is_none());
}
