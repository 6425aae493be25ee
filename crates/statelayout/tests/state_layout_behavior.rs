#![forbid(unsafe_code)]

//! Behavioral tests for `StateLayout` as a host screen would use it.
//!
//! These cover:
//! - lazy batch construction and container attachment
//! - default fallback from an empty attribute block
//! - dismiss specificity
//! - retry wiring through render + hit test + tap
//! - progress updates in place
//! - loading a config file from disk

use std::cell::Cell;
use std::io::Write as _;
use std::rc::Rc;

use statelayout::render::arrange;
use statelayout::{
    Buffer, ConfigError, Container, EmptyRequest, ErrorRequest, LoadingRequest, OverlayKind,
    ProgressRequest, Rect, RetryPolicy, Rgb, State, StateLayout, StateLayoutConfig, ViewGroup,
    ViewId, Widget,
};
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::TRACE)
        .try_init();
}

fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
    let calls = Rc::new(Cell::new(0));
    let inner = Rc::clone(&calls);
    (calls, move || inner.set(inner.get() + 1))
}

#[test]
fn overlays_are_built_as_a_batch_on_first_show() {
    init_tracing();
    let host_content = ViewId::next();
    let mut layout = StateLayout::with_container(
        StateLayoutConfig::default(),
        ViewGroup::with_children([host_content]),
    );
    assert_eq!(layout.container().children(), vec![host_content]);
    for kind in OverlayKind::ALL {
        assert!(layout.overlay(kind).is_none());
    }

    layout.show_error(ErrorRequest::new());

    let children = layout.container().children();
    assert_eq!(children.len(), 5);
    for kind in OverlayKind::ALL {
        let view = layout.overlay(kind).expect("built");
        assert!(children.contains(&view.id));
    }
}

#[test]
fn empty_config_falls_back_to_built_in_text() {
    let config = StateLayoutConfig::from_toml_str("").unwrap();
    let mut layout = StateLayout::new(config);
    layout.show_empty(EmptyRequest::new());

    let view = layout.overlay(OverlayKind::Empty).unwrap();
    assert_eq!(view.title_text(), Some("No item found"));
    assert_eq!(view.message_text(), "Enjoy free day");
}

#[test]
fn show_loading_twice_is_idempotent() {
    let mut layout = StateLayout::default();
    layout.show_loading(LoadingRequest::new());
    let children = layout.container().children();
    layout.show_loading(LoadingRequest::new());
    assert_eq!(layout.current_state(), State::Loading);
    assert_eq!(layout.container().children(), children);
}

#[test]
fn dismissing_a_hidden_overlay_leaves_the_visible_one() {
    let mut layout = StateLayout::default();
    layout.show_loading(LoadingRequest::new());
    layout.dismiss_error();
    assert_eq!(layout.current_state(), State::Loading);
    assert!(layout.overlay(OverlayKind::Loading).unwrap().is_visible());
}

#[test]
fn tapping_rendered_retry_button_runs_callback_once() {
    init_tracing();
    let (calls, on_retry) = counter();
    let mut layout = StateLayout::default();
    layout.show_error(ErrorRequest::new().on_retry(on_retry));

    let area = Rect::from_size(48, 16);
    let mut buf = Buffer::new(area.width, area.height);
    layout.render(area, &mut buf);
    let row = buf
        .to_lines()
        .iter()
        .position(|line| line.contains("[ Retry ]"))
        .expect("button drawn");
    let col = buf.to_lines()[row].find('[').unwrap() as u16;

    let target = layout.hit_test(area, col, row as u16).expect("hit");
    assert_eq!(Some(target), layout.retry_button_id());
    assert!(layout.tap(target));

    assert_eq!(calls.get(), 1);
    assert_eq!(layout.current_state(), State::Content);
    assert!(!layout.overlay(OverlayKind::Error).unwrap().is_visible());
}

#[test]
fn retry_can_switch_to_loading_before_callback() {
    let config = StateLayoutConfig::from_toml_str("[error]\nretry_policy = \"show_loading\"").unwrap();
    assert_eq!(config.error.retry_policy, RetryPolicy::ShowLoading);

    let seen = Rc::new(Cell::new(None));
    let mut layout = StateLayout::new(config);
    let probe = Rc::clone(&seen);
    // The callback cannot reach the layout, so record that it ran.
    layout.show_error(ErrorRequest::new().on_retry(move || probe.set(Some(()))));
    let button = layout.retry_button_id().unwrap();
    layout.tap(button);

    assert_eq!(layout.current_state(), State::Loading);
    assert_eq!(seen.get(), Some(()));
}

#[test]
fn progress_update_keeps_progress_visible() {
    let mut layout = StateLayout::default();
    layout.show_progress(ProgressRequest::new().percent(10));
    layout.update_progress(50);

    assert_eq!(layout.current_state(), State::Progress);
    let view = layout.overlay(OverlayKind::Progress).unwrap();
    assert_eq!(view.progress(), Some(50));

    let area = Rect::from_size(40, 5);
    let bar = arrange(view, area)
        .into_iter()
        .find(|placed| placed.text.contains('%'))
        .unwrap();
    assert!(bar.text.ends_with(" 50%"));
}

#[test]
fn configured_colors_reach_the_buffer() {
    let config = StateLayoutConfig::from_toml_str(
        r##"
        [loading]
        background = "#102030"
        "##,
    )
    .unwrap();
    let mut layout = StateLayout::new(config);
    layout.show_loading(LoadingRequest::new());

    let mut buf = Buffer::new(10, 4);
    layout.render(buf.area(), &mut buf);
    assert_eq!(buf.get(0, 0).unwrap().bg, Rgb::new(0x10, 0x20, 0x30));
}

#[test]
fn config_file_loads_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[empty]\ntitle = \"Inbox zero\"").unwrap();

    let config = StateLayoutConfig::load(file.path()).unwrap();
    assert_eq!(config.empty.title, "Inbox zero");
    assert_eq!(config.empty.message, "Enjoy free day");
}

#[test]
fn json_config_file_loads_by_extension() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"error": {{"button_text": "Again"}}}}"#).unwrap();

    let config = StateLayoutConfig::load(file.path()).unwrap();
    assert_eq!(config.error.button_text, "Again");
}

#[test]
fn invalid_config_file_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[loading]\nindicator_width = 0").unwrap();

    match StateLayoutConfig::load(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("loading.indicator_width"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}
