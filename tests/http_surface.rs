//! End-to-end tests for the dashboard HTTP surface.
//!
//! Device lines are fed through a real `SerialMonitor` reading from an
//! in-memory transcript, and the router is driven in-process.

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use line_timer_lib::clock::ManualClock;
use line_timer_lib::device::CommandSink;
use line_timer_lib::monitor::{Poll, SerialMonitor};
use line_timer_lib::server::{router, AppState};
use line_timer_lib::state::TimerStore;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Clone, Default)]
struct RecordingDevice(Arc<Mutex<Vec<u8>>>);

impl Write for RecordingDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct DisconnectedDevice;

impl Write for DisconnectedDevice {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "device disconnected"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "device disconnected"))
    }
}

fn app_with(commands: CommandSink) -> (Router, TimerStore) {
    let timer = TimerStore::new();
    let app = router(AppState {
        timer: timer.clone(),
        commands,
    });
    (app, timer)
}

/// Runs every line of `transcript` through a monitor at the clock's current time.
fn feed(timer: &TimerStore, clock: &ManualClock, transcript: &str) {
    let mut monitor = SerialMonitor::new(Cursor::new(transcript.to_string()), clock.clone(), timer.clone());
    while monitor.poll_once().unwrap() != Poll::Eof {}
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = send(app, "GET", uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn fresh_process_reports_empty_timer() {
    let (app, _) = app_with(CommandSink::new(RecordingDevice::default()));

    assert_eq!(
        get_json(&app, "/timer").await,
        json!({"start": null, "stop": null, "formatted": ""})
    );
    assert_eq!(get_json(&app, "/data").await, json!({"data": ""}));
}

#[tokio::test]
async fn start_then_time_without_stop() {
    let (app, timer) = app_with(CommandSink::new(RecordingDevice::default()));
    let clock = ManualClock::new(1000);

    feed(&timer, &clock, "START\n");
    assert_eq!(
        get_json(&app, "/timer").await,
        json!({"start": 1000, "stop": null, "formatted": ""})
    );

    clock.advance(5120);
    feed(&timer, &clock, "TIME 00:05:120\n");
    assert_eq!(
        get_json(&app, "/timer").await,
        json!({"start": 1000, "stop": null, "formatted": "00:05:120"})
    );
    assert_eq!(get_json(&app, "/data").await, json!({"data": "TIME 00:05:120"}));
}

#[tokio::test]
async fn complete_run_round_trip() {
    let (app, timer) = app_with(CommandSink::new(RecordingDevice::default()));
    let clock = ManualClock::new(1_700_000_000_000);

    feed(&timer, &clock, "WAITING\r\nSTART 2210\r\n");
    clock.advance(12_345);
    feed(&timer, &clock, "STOP 14555\r\nTIME 00:12:345\r\n");

    let body = get_json(&app, "/timer").await;
    let start = body["start"].as_i64().unwrap();
    let stop = body["stop"].as_i64().unwrap();
    assert!(start <= stop);
    assert_eq!(stop - start, 12_345);
    assert_eq!(body["formatted"], "00:12:345");
}

#[tokio::test]
async fn new_start_discards_finished_run() {
    let (app, timer) = app_with(CommandSink::new(RecordingDevice::default()));
    let clock = ManualClock::new(1000);

    feed(&timer, &clock, "START\nSTOP\nTIME 00:00:000\n");
    clock.set(9000);
    feed(&timer, &clock, "START\n");

    assert_eq!(
        get_json(&app, "/timer").await,
        json!({"start": 9000, "stop": null, "formatted": ""})
    );
}

#[tokio::test]
async fn button_press_sends_go() {
    let device = RecordingDevice::default();
    let (app, _) = app_with(CommandSink::new(device.clone()));

    let (status, body) = send(&app, "POST", "/simulate_button_press").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(device.0.lock().unwrap().as_slice(), b"GO\n");
}

#[tokio::test]
async fn button_press_on_disconnected_device_is_a_500() {
    let (app, _) = app_with(CommandSink::new(DisconnectedDevice));

    let (status, body) = send(&app, "POST", "/simulate_button_press").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        json!({"status": "error", "message": "device disconnected"})
    );

    // The server keeps answering after the failed write.
    assert_eq!(
        get_json(&app, "/timer").await,
        json!({"start": null, "stop": null, "formatted": ""})
    );
}

#[tokio::test]
async fn button_press_requires_post() {
    let (app, _) = app_with(CommandSink::new(RecordingDevice::default()));
    let (status, _) = send(&app, "GET", "/simulate_button_press").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn index_serves_the_polling_dashboard() {
    let (app, _) = app_with(CommandSink::new(RecordingDevice::default()));

    let (status, body) = send(&app, "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("Line Follower Timer"));
    assert!(page.contains("fetch('/timer')"));
    assert!(page.contains("/simulate_button_press"));
}
