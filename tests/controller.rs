use std::io::Cursor as TextCursor;
use std::sync::{Arc, Mutex};

use plotctrl::{
    Accepted, ChangeRequest, DevicePoint, DeviceSize, Key, LoadOptions, Modifiers, MouseEvent,
    MouseEventKind, MouseFunction, PlotConfig, PlotCtrl, PlotData, PlotEvent, PlotListener,
    PlotRect, Point, RangeInt, RedrawNeed, RenderList, SelectionType, SubWindow, Vetoed,
    parse_delimited,
};

#[derive(Default)]
struct Record {
    events: Vec<String>,
    veto_views: bool,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Record>>);

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().events.clone()
    }

    fn clear(&self) {
        self.0.lock().unwrap().events.clear();
    }

    fn veto_views(&self, veto: bool) {
        self.0.lock().unwrap().veto_views = veto;
    }

    fn count(&self, prefix: &str) -> usize {
        self.events().iter().filter(|event| event.starts_with(prefix)).count()
    }
}

impl PlotListener for Recorder {
    fn request_change(&mut self, request: &ChangeRequest) -> Result<Accepted, Vetoed> {
        let record = self.0.lock().unwrap();
        if record.veto_views && matches!(request, ChangeRequest::View { .. }) {
            return Err(Vetoed);
        }
        Ok(Accepted)
    }

    fn notify(&mut self, event: &PlotEvent) {
        self.0.lock().unwrap().events.push(format!("{event:?}"));
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn controller() -> (PlotCtrl, Recorder) {
    init_logging();
    let config = PlotConfig {
        correct_ticks: false,
        ..PlotConfig::default()
    };
    let recorder = Recorder::default();
    let mut plot = PlotCtrl::new(Arc::new(config)).with_listener(recorder.clone());
    plot.set_area_size(DeviceSize::new(100, 100));
    recorder.clear();
    (plot, recorder)
}

fn diagonal(n: usize) -> PlotData {
    PlotData::from_points((0..n).map(|i| Point::new(i as f64, i as f64))).unwrap()
}

fn mouse(plot: &mut PlotCtrl, x: i32, y: i32, kind: MouseEventKind) {
    plot.on_area_mouse(MouseEvent::new(DevicePoint::new(x, y), kind, Modifiers::NONE));
}

#[test]
fn select_then_deselect_scenario() {
    let (mut plot, _) = controller();
    let curve = PlotData::from_points([
        Point::new(0.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(2.0, 0.0),
    ])
    .unwrap();
    let index = plot.add_curve(curve, true);
    assert!(plot.set_view_rect(PlotRect::new(5.0, 5.0, 1.0, 1.0)));
    assert!(plot.make_curve_visible(Some(index)));
    assert!(!plot.make_curve_visible(Some(index)));

    let view = plot.view_rect();
    assert!(view.left() < 0.0 && view.right() > 2.0);
    assert!(view.bottom() < 0.0 && view.top() > 1.0);

    assert!(plot.select_data_range(index, RangeInt::new(0, 1)));
    assert_eq!(plot.selected_range_count(index), 1);
    assert!(plot.deselect_data_range(index, RangeInt::point(1)));
    let ranges = plot.selected_ranges(index).unwrap().ranges();
    assert_eq!(ranges, &[RangeInt::new(0, 0)]);
}

#[test]
fn zoom_fit_pads_curve_bounds() {
    let (mut plot, _) = controller();
    plot.add_curve(
        PlotData::from_points([Point::new(0.0, 0.0), Point::new(10.0, 10.0)]).unwrap(),
        false,
    );
    assert!(plot.set_view_rect(PlotRect::new(3.0, 3.0, 1.0, 1.0)));
    assert!(plot.set_zoom(-1.0, -1.0, 0.0, 0.0));

    let zoom = plot.zoom();
    assert!((zoom.x - 10.0).abs() < 0.5);
    assert!((zoom.y - 10.0).abs() < 0.5);
    let view = plot.view_rect();
    assert!((view.x + 0.2).abs() < 1e-9);
    assert!((view.y + 0.2).abs() < 1e-9);
    assert!((view.width - 10.4).abs() < 1e-9);
    assert!((view.height - 10.4).abs() < 1e-9);
}

#[test]
fn flat_curve_is_fitted_around_its_value() {
    let (mut plot, _) = controller();
    plot.add_curve(
        PlotData::from_points([Point::new(0.0, 500.0), Point::new(1.0, 500.0), Point::new(2.0, 500.0)])
            .unwrap(),
        true,
    );
    assert!(plot.set_view_rect(PlotRect::new(0.0, 0.0, 1.0, 1.0)));
    assert!(plot.make_curve_visible(None));

    let view = plot.view_rect();
    assert!(view.bottom() < 500.0 && view.top() > 500.0);
    assert!(((view.bottom() + view.top()) / 2.0 - 500.0).abs() < 1e-9);
    assert!(view.left() < 0.0 && view.right() > 2.0);

    assert!(plot.set_view_rect(PlotRect::new(0.0, 0.0, 1.0, 1.0)));
    assert!(plot.make_curve_visible(Some(0)));
    assert!(plot.view_rect().contains(Point::new(1.0, 500.0)));
}

#[test]
fn curve_without_finite_points_does_not_widen_the_fit() {
    let (mut plot, _) = controller();
    plot.add_curve(PlotData::from_vecs(vec![f64::NAN], vec![f64::NAN]).unwrap(), false);
    plot.add_curve(
        PlotData::from_points([Point::new(100.0, 100.0), Point::new(110.0, 110.0)]).unwrap(),
        false,
    );
    plot.make_curve_visible(None);

    let view = plot.view_rect();
    assert!(view.left() > 90.0);
    assert!(view.bottom() > 90.0);
    assert!((view.width - 10.4).abs() < 1e-9);
    assert!(!view.contains(Point::new(0.0, 0.0)));
}

#[test]
fn unchanged_view_is_not_reported() {
    let (mut plot, recorder) = controller();
    assert!(plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0)));
    for window in SubWindow::ALL {
        plot.paint(window, &mut RenderList::new());
    }
    recorder.clear();

    assert!(!plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0)));
    assert!(!plot.set_origin(0.0, 0.0));
    assert_eq!(recorder.count("ViewChanged"), 0);
    assert_eq!(plot.dirty(), RedrawNeed::NONE);
}

#[test]
fn single_curve_policy_clears_other_curves() {
    let (mut plot, recorder) = controller();
    let a = plot.add_curve(diagonal(5), false);
    let b = plot.add_curve(diagonal(5), false);

    plot.set_selection_type(SelectionType::SingleCurve);
    assert!(plot.select_data_range(a, RangeInt::new(0, 1)));
    for window in SubWindow::ALL {
        plot.paint(window, &mut RenderList::new());
    }
    recorder.clear();

    assert!(plot.select_data_range(b, RangeInt::new(2, 3)));
    assert!(!plot.has_selection(Some(a)));
    assert_eq!(plot.selected_ranges(b).unwrap().ranges(), &[RangeInt::new(2, 3)]);
    assert!(!plot.is_batched());
    assert_eq!(plot.dirty(), RedrawNeed::AREA);
    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("RangeSelectionChanged { curve: 0,"));
    assert!(events[0].ends_with("selected: false }"));
    assert!(events[1].starts_with("RangeSelectionChanged { curve: 1,"));
    assert!(events[1].ends_with("selected: true }"));

    recorder.clear();
    assert!(plot.select_x_range(Some(a), 0.0, 0.5));
    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("RangeSelectionChanged { curve: 1,"));
    assert!(events[0].ends_with("selected: false }"));
    assert!(events[1].starts_with("RangeSelectionChanged { curve: 0,"));
    assert!(events[1].ends_with("selected: true }"));
    assert!(!plot.has_selection(Some(b)));

    plot.set_selection_type(SelectionType::Multiple);
    assert!(!plot.has_selection(None));
    assert!(plot.select_data_range(a, RangeInt::new(0, 1)));
    assert!(plot.select_data_range(b, RangeInt::new(2, 3)));
    assert!(plot.has_selection(Some(a)) && plot.has_selection(Some(b)));

    plot.set_selection_type(SelectionType::None);
    assert!(!plot.select_data_range(a, RangeInt::new(0, 1)));
}

#[test]
fn drag_zooms_into_rectangle() {
    let (mut plot, recorder) = controller();
    plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
    recorder.clear();

    mouse(&mut plot, 10, 10, MouseEventKind::Down);
    mouse(&mut plot, 60, 60, MouseEventKind::Drag);
    assert_eq!(plot.drag_rect(), Some(plotctrl::DeviceRect::new(10, 10, 50, 50)));
    mouse(&mut plot, 60, 60, MouseEventKind::Up);

    let view = plot.view_rect();
    assert!((view.x - 1.0).abs() < 1e-9);
    assert!((view.y - 4.0).abs() < 1e-9);
    assert!((view.width - 5.0).abs() < 1e-9);
    assert!((view.height - 5.0).abs() < 1e-9);
    assert_eq!(plot.history().current(), Some(view));
    assert_eq!(plot.drag_rect(), None);
    assert_eq!(plot.capture(), None);

    assert_eq!(recorder.count("AreaSelectionCreating"), 1);
    assert_eq!(recorder.count("AreaSelectionCreated"), 1);
    assert_eq!(recorder.count("ViewChanged"), 1);
}

#[test]
fn small_drag_does_not_zoom() {
    let (mut plot, _) = controller();
    plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
    mouse(&mut plot, 10, 10, MouseEventKind::Down);
    mouse(&mut plot, 15, 15, MouseEventKind::Drag);
    mouse(&mut plot, 15, 15, MouseEventKind::Up);
    assert_eq!(plot.view_rect(), PlotRect::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn drag_selects_points_of_active_curve() {
    let (mut plot, recorder) = controller();
    let index = plot.add_curve(diagonal(11), true);
    plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
    assert!(plot.set_mouse_function(MouseFunction::Select));
    recorder.clear();

    mouse(&mut plot, 25, 80, MouseEventKind::Down);
    mouse(&mut plot, 55, 40, MouseEventKind::Drag);
    mouse(&mut plot, 55, 40, MouseEventKind::Up);

    assert_eq!(plot.selected_ranges(index).unwrap().ranges(), &[RangeInt::new(3, 5)]);
    assert_eq!(plot.view_rect(), PlotRect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(recorder.count("RangeSelectionChanged"), 1);
}

#[test]
fn vetoed_view_change_is_not_applied() {
    let (mut plot, recorder) = controller();
    plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
    recorder.clear();
    recorder.veto_views(true);

    assert!(!plot.set_origin(5.0, 5.0));
    assert!(plot.on_key(Key::Right, Modifiers::NONE));
    assert_eq!(plot.view_rect(), PlotRect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(recorder.count("ViewChanged"), 0);

    recorder.veto_views(false);
    assert!(plot.set_origin(5.0, 5.0));
    assert_eq!(recorder.count("ViewChanged"), 1);
}

#[test]
fn non_finite_zoom_reports_error() {
    let (mut plot, recorder) = controller();
    let before = plot.view_rect();
    assert!(!plot.set_zoom(f64::NAN, 1.0, 0.0, 0.0));
    assert_eq!(plot.view_rect(), before);
    assert_eq!(recorder.count("Error"), 1);
}

#[test]
fn batch_queues_notifications() {
    let (mut plot, recorder) = controller();
    plot.add_curve(diagonal(3), false);
    recorder.clear();

    plot.begin_batch();
    plot.begin_batch();
    assert!(plot.set_origin(1.0, 1.0));
    assert!(plot.set_active_index(Some(0)));
    plot.end_batch(false);
    assert!(recorder.events().is_empty());
    assert!(plot.is_batched());

    plot.end_batch(false);
    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("ViewChanged"));
    assert!(events[1].starts_with("ActiveCurveChanged"));
    assert!(!plot.is_batched());
    assert_eq!(plot.dirty(), RedrawNeed::ALL);
}

#[test]
fn keyboard_moves_cursor_and_clears_state() {
    let (mut plot, _) = controller();
    let index = plot.add_curve(diagonal(11), true);
    assert!(plot.set_cursor_data_index(index, 5));

    assert!(plot.on_key(Key::Char('.'), Modifiers::NONE));
    assert_eq!(plot.cursor().map(|cursor| cursor.index), Some(6));
    assert!(plot.on_key(Key::Char(','), Modifiers::NONE));
    assert_eq!(plot.cursor().map(|cursor| cursor.index), Some(5));

    assert!(plot.on_key(Key::Space, Modifiers::SHIFT));
    assert_eq!(plot.selected_ranges(index).unwrap().ranges(), &[RangeInt::point(5)]);

    assert!(plot.on_key(Key::Escape, Modifiers::NONE));
    assert!(!plot.has_selection(None));
    assert!(plot.is_cursor_valid());
    assert!(plot.on_key(Key::Escape, Modifiers::NONE));
    assert!(!plot.is_cursor_valid());
    assert!(plot.on_key(Key::Escape, Modifiers::NONE));
    assert_eq!(plot.active_index(), None);

    assert!(!plot.on_key(Key::Char('y'), Modifiers::NONE));
}

#[test]
fn arrow_keys_pan_by_a_tenth() {
    let (mut plot, _) = controller();
    plot.set_view_rect(PlotRect::new(0.0, 0.0, 10.0, 10.0));
    plot.on_key(Key::Right, Modifiers::NONE);
    plot.on_key(Key::PageUp, Modifiers::NONE);
    let view = plot.view_rect();
    assert!((view.x - 1.0).abs() < 1e-9);
    assert!((view.y - 5.0).abs() < 1e-9);
}

#[test]
fn deleting_all_curves_resets_state() {
    let (mut plot, recorder) = controller();
    plot.add_curve(diagonal(4), true);
    plot.add_curve(diagonal(4), false);
    plot.set_cursor_data_index(0, 2);
    plot.select_data_range(1, RangeInt::new(0, 3));
    recorder.clear();

    assert!(plot.delete_curve(None));
    assert_eq!(plot.curve_count(), 0);
    assert_eq!(plot.active_index(), None);
    assert!(!plot.is_cursor_valid());
    assert!(!plot.has_selection(None));
    assert_eq!(recorder.count("CurveDeleted"), 1);
    assert!(recorder.events().last().unwrap().starts_with("CurveDeleted"));
}

#[test]
fn loaded_curve_is_plotted() {
    let (mut plot, _) = controller();
    let text = "# demo\n0 1\n1 3\n2 2\n";
    let loaded = parse_delimited(TextCursor::new(text), &LoadOptions::default()).unwrap();
    let index = plot.add_curve(loaded.data.with_name("demo"), true);
    assert_eq!(plot.key_string(), "demo");
    assert!(plot.set_cursor_x_point(index, 1.2));
    assert_eq!(plot.cursor_point(), Some(Point::new(1.0, 3.0)));
}
