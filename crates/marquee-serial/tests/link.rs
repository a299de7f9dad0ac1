// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pull loop against a harness engine and a capturing sink.

use std::io::Cursor;

use marquee_config::model::SerialConfig;
use marquee_core::{Message, Utility};
use marquee_serial::{run_link, serve_pull};
use marquee_test_utils::{MockSink, TestHarness};
use tokio_util::sync::CancellationToken;

#[test]
fn frames_decode_to_the_scheduled_messages() {
    let harness = TestHarness::builder().build().unwrap();
    harness.submit("HELLO");
    harness.submit("!B-10");

    let sink = MockSink::new();
    let mut writer = sink.clone();
    for _ in 0..3 {
        serve_pull(&harness.engine, &mut writer, 700);
    }

    let messages = sink.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], Message::Utility(Utility::Brightness(Some(-10))));
    assert_eq!(messages[1], Message::new_message_announcement());
    assert_eq!(messages[2].text(), "HELLO");
}

#[test]
fn unplugged_sink_keeps_the_loop_alive() {
    let harness = TestHarness::builder().build().unwrap();
    harness.submit("A");
    let mut sink = MockSink::failing();
    // A single read delivers all three bytes, so one pull.
    let pulls = run_link(
        &harness.engine,
        Cursor::new(b"abc".to_vec()),
        &mut sink,
        &SerialConfig::default(),
        &CancellationToken::new(),
    );
    assert_eq!(pulls, 1);
    // The pull still advanced the schedule.
    assert_eq!(harness.pull().text(), "A");
}
