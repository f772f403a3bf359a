// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Scenarios for the poll coordinator: scheduling, staleness, and the
//! consumer handle.

use std::time::Duration;

use ventra_core::PollCoordinator;
use ventra_entities::{alarm_report, ClimateCommands, ClimateState, FanMode, HvacMode};
use ventra_tests::fixtures::{engine_stack, mixed_catalog};

fn coordinator_stack() -> (
    PollCoordinator,
    ventra_core::CoordinatorHandle,
    ventra_tests::MockHandle,
) {
    let (_bus, engine, gateway, mock) = engine_stack(mixed_catalog(), Duration::ZERO);
    let (coordinator, handle) = PollCoordinator::new(engine, gateway, Duration::from_secs(30));
    (coordinator, handle, mock)
}

#[tokio::test]
async fn connectivity_failure_preserves_last_known_good_snapshot() {
    // Reopen-per-poll policy so every cycle exercises the connect path.
    let mut settings = ventra_tests::fixtures::fast_settings();
    settings.close_after_poll = true;
    let (_bus, engine, gateway, mock) =
        ventra_tests::fixtures::engine_stack_with(mixed_catalog(), Duration::ZERO, settings);
    let (coordinator, handle) = PollCoordinator::new(engine, gateway, Duration::from_secs(30));

    mock.set_holding(2000, 210);
    coordinator.poll_once().await;
    assert!(handle.is_fresh());
    let good = handle.latest().unwrap();

    mock.fail_connect(true);
    coordinator.poll_once().await;

    assert!(!handle.is_fresh());
    assert_eq!(handle.consecutive_failures(), 1);
    // The previous snapshot stays visible as the last-known-good value.
    assert!(handle.latest().unwrap().same_values(&good));
}

#[tokio::test]
async fn staleness_counter_resets_on_recovery() {
    let (coordinator, handle, mock) = coordinator_stack();
    mock.fail_connect(true);

    coordinator.poll_once().await;
    coordinator.poll_once().await;
    assert_eq!(handle.consecutive_failures(), 2);
    assert!(!handle.is_fresh());

    mock.fail_connect(false);
    coordinator.poll_once().await;
    assert!(handle.is_fresh());
    assert_eq!(handle.consecutive_failures(), 0);
    assert!(handle.latest().is_some());
}

#[tokio::test]
async fn request_write_reports_failure_as_false() {
    let (_coordinator, handle, mock) = coordinator_stack();
    mock.fail_all_writes(true);

    assert!(!handle.request_write(2504, 1).await);

    mock.fail_all_writes(false);
    assert!(handle.request_write(2504, 1).await);
    assert_eq!(mock.holding(2504), Some(1));
}

#[tokio::test]
async fn climate_commands_write_and_refresh() {
    let (coordinator, handle, mock) = coordinator_stack();
    mock.set_input(1130, 2);
    mock.set_input(12102, 215);
    coordinator.poll_once().await;

    let state = ClimateState::from_snapshot(&handle.latest().unwrap());
    assert_eq!(state.fan_mode, FanMode::Low);
    assert_eq!(state.current_temperature, Some(21.5));
    assert_eq!(state.hvac_mode, HvacMode::Off);

    let commands = ClimateCommands::new(handle.clone());
    assert!(commands.set_fan_mode(FanMode::High).await);
    // The command wrote the fan speed register and queued a refresh.
    assert_eq!(mock.holding(1130), Some(4));

    assert!(commands.set_target_temperature(22.5).await);
    assert_eq!(mock.holding(2000), Some(225));

    // Out-of-range setpoints never reach the bus.
    let writes_before = mock.write_count();
    assert!(!commands.set_target_temperature(99.0).await);
    assert_eq!(mock.write_count(), writes_before);
}

#[tokio::test]
async fn run_loop_serves_subscribers_and_refreshes() {
    let (_bus, engine, gateway, mock) = engine_stack(mixed_catalog(), Duration::ZERO);
    mock.set_holding(2000, 210);
    // A long interval: only the immediate first tick and explicit refreshes
    // should drive polls during this test.
    let (coordinator, handle) = PollCoordinator::new(engine, gateway, Duration::from_secs(300));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let loop_task = tokio::spawn(coordinator.run(async move {
        let _ = stop_rx.await;
    }));

    let mut rx = handle.subscribe();
    tokio::time::timeout(Duration::from_secs(1), async {
        while rx.borrow_and_update().is_none() {
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("initial poll not published");
    assert_eq!(handle.latest().unwrap().number("target_temp"), Some(21.0));

    // A write followed by a refresh produces a snapshot with the new value.
    assert!(handle.request_write(2000, 230).await);
    handle.request_refresh();
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            rx.changed().await.unwrap();
            let current = rx.borrow_and_update().clone();
            if let Some(snapshot) = current {
                if snapshot.number("target_temp") == Some(23.0) {
                    break;
                }
            }
        }
    })
    .await
    .expect("refresh did not observe the written value");

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(1), loop_task)
        .await
        .expect("poll loop did not stop")
        .unwrap();
}

#[tokio::test]
async fn alarm_report_only_after_first_poll() {
    let (coordinator, handle, _mock) = coordinator_stack();
    assert!(alarm_report(&handle).is_none());

    coordinator.poll_once().await;
    // The mixed catalog has no alarm keys, so the report is an empty object.
    let report = alarm_report(&handle).unwrap();
    assert!(report.as_object().unwrap().is_empty());
}
