//! Display surface tests.
//!
//! Frames are rendered from registry snapshots with colours off so the output
//! is plain text, and the display loop writes into an in-memory buffer.

use ember_activity::ActivityRegistry;
use ember_display::{Display, DisplayMode, RenderOptions, render};
use pretty_assertions::assert_eq;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn render_to_string(registry: &ActivityRegistry, now: Instant, title: &str) -> String {
    let options = RenderOptions {
        title: title.to_string(),
        ..Default::default()
    };
    let frame = render(&registry.snapshot(), now, &options);
    frame.lines().collect::<Vec<_>>().join("\n")
}

#[test]
fn test_empty_registry_renders_title_only() {
    let registry = ActivityRegistry::new();
    let output = render_to_string(&registry, Instant::now(), "Building site");
    insta::assert_snapshot!(output, @"Building site");
}

#[test]
fn test_frame_with_history_and_live_panel() {
    let registry = ActivityRegistry::new();
    let t0 = Instant::now();

    registry.start_at("compile", t0);
    registry.start_at("bundle", t0);
    registry.set_status("bundle", "minifying").unwrap();
    registry.log_success("onPreBootstrap");
    registry
        .end_at(
            "compile",
            "compile — 1.234 s — linking",
            t0 + Duration::from_millis(1234),
        )
        .unwrap();
    registry.start_at("query", t0 + Duration::from_millis(500));

    let output = render_to_string(&registry, t0 + Duration::from_millis(2500), "Building site");
    insta::assert_snapshot!(output, @r###"
    Building site
    success onPreBootstrap
    success compile — 1.234 s — linking
    ⠋ bundle — 2.500 s — minifying
    ⠋ query — 2.000 s
    "###);
}

#[test]
fn test_duplicate_messages_render_separately() {
    let registry = ActivityRegistry::new();
    registry.log_success("cache hit");
    registry.log_success("cache hit");

    let output = render_to_string(&registry, Instant::now(), "");
    insta::assert_snapshot!(output, @r###"
    success cache hit
    success cache hit
    "###);
}

#[tokio::test]
async fn test_plain_display_prints_history_once() {
    let registry = ActivityRegistry::new();
    let buffer = SharedBuffer::default();
    let (done_tx, done_rx) = oneshot::channel();

    let display = Display::new(registry.subscribe())
        .mode(DisplayMode::Plain)
        .colors(false)
        .title("Building")
        .writer(buffer.clone());
    let handle = tokio::spawn(display.run(done_rx));

    registry.start("compile");
    registry.log_success("first");
    tokio::time::sleep(Duration::from_millis(100)).await;

    registry.end("compile", "compile — 0.100 s").unwrap();
    registry.log_success("first");
    done_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(
        buffer.contents(),
        "Building\nsuccess first\nsuccess first\nsuccess compile — 0.100 s\n"
    );
}

#[tokio::test]
async fn test_restarted_activity_prints_each_summary() {
    let registry = ActivityRegistry::new();
    let buffer = SharedBuffer::default();
    let (done_tx, done_rx) = oneshot::channel();

    let display = Display::new(registry.subscribe())
        .mode(DisplayMode::Plain)
        .colors(false)
        .title("")
        .writer(buffer.clone());
    let handle = tokio::spawn(display.run(done_rx));

    registry.start("step");
    registry.end("step", "step — run 1").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    registry.start("step");
    registry.end("step", "step — run 2").unwrap();
    done_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(
        buffer.contents(),
        "success step — run 1\nsuccess step — run 2\n"
    );
}

#[tokio::test]
async fn test_interactive_display_redraws_and_clears_live_panel() {
    let registry = ActivityRegistry::new();
    let buffer = SharedBuffer::default();
    let (done_tx, done_rx) = oneshot::channel();

    let display = Display::new(registry.subscribe())
        .mode(DisplayMode::Interactive)
        .colors(false)
        .title("")
        .max_fps(50)
        .writer(buffer.clone());
    let handle = tokio::spawn(display.run(done_rx));

    registry.start("bundle");
    registry.set_status("bundle", "minifying").unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    registry.end("bundle", "bundle — 0.150 s — minifying").unwrap();
    done_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    let output = buffer.contents();
    assert!(output.contains(" bundle — "));
    assert!(output.contains("— minifying\n"));
    // Live panel of one line is moved over and cleared before each redraw.
    assert!(output.contains("\u{1b}[1F\u{1b}[J"));
    assert!(output.ends_with("success bundle — 0.150 s — minifying\n"));
}

#[tokio::test]
async fn test_display_stops_when_registry_is_dropped() {
    let registry = ActivityRegistry::new();
    let buffer = SharedBuffer::default();
    let (_done_tx, done_rx) = oneshot::channel::<()>();

    let display = Display::new(registry.subscribe())
        .mode(DisplayMode::Plain)
        .colors(false)
        .title("")
        .writer(buffer.clone());
    let handle = tokio::spawn(display.run(done_rx));

    registry.log_success("last words");
    drop(registry);

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("display should stop")
        .unwrap()
        .unwrap();
    assert_eq!(buffer.contents(), "success last words\n");
}

#[tokio::test]
async fn test_frame_rate_above_one_thousand() {
    let registry = ActivityRegistry::new();
    let buffer = SharedBuffer::default();
    let (done_tx, done_rx) = oneshot::channel();

    let display = Display::new(registry.subscribe())
        .mode(DisplayMode::Plain)
        .colors(false)
        .title("")
        .max_fps(2000)
        .writer(buffer.clone());
    let handle = tokio::spawn(display.run(done_rx));

    registry.log_success("fast");
    tokio::time::sleep(Duration::from_millis(20)).await;
    done_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(buffer.contents(), "success fast\n");
}

#[tokio::test]
async fn test_output_through_handle_is_printed_above_live_panel() {
    let registry = ActivityRegistry::new();
    let buffer = SharedBuffer::default();
    let (done_tx, done_rx) = oneshot::channel();

    let display = Display::new(registry.subscribe())
        .mode(DisplayMode::Interactive)
        .colors(false)
        .title("")
        .writer(buffer.clone());
    let terminal = display.handle();
    let handle = tokio::spawn(display.run(done_rx));

    registry.start("compile");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut errors = terminal.writer_above(buffer.clone());
    writeln!(errors, "error boom\n  × step `compile` failed").unwrap();
    errors.flush().unwrap();

    let output = buffer.contents();
    let (before, after) = output
        .rsplit_once("error boom\n  × step `compile` failed\n")
        .unwrap();
    // The panel is cleared before the error and redrawn below it.
    assert!(before.ends_with("\u{1b}[1F\u{1b}[J"), "{before:?}");
    assert!(after.contains(" compile — "), "{after:?}");

    done_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    let output = buffer.contents();
    assert!(output.contains("error boom\n  × step `compile` failed\n"));
    assert!(output.ends_with("\u{1b}[1F\u{1b}[J"));
}

#[tokio::test]
async fn test_finish_flushes_pending_history_and_stops_drawing() {
    let registry = ActivityRegistry::new();
    let buffer = SharedBuffer::default();
    let (done_tx, done_rx) = oneshot::channel();

    let display = Display::new(registry.subscribe())
        .mode(DisplayMode::Interactive)
        .colors(false)
        .title("")
        .writer(buffer.clone());
    let terminal = display.handle();
    let handle = tokio::spawn(display.run(done_rx));

    registry.start("compile");
    tokio::time::sleep(Duration::from_millis(100)).await;

    registry.log_success("late");
    terminal.finish().unwrap();
    let finished = buffer.contents();
    assert!(finished.ends_with("\u{1b}[1F\u{1b}[Jsuccess late\n"), "{finished:?}");

    tokio::time::sleep(Duration::from_millis(100)).await;
    done_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(buffer.contents(), finished);
}
