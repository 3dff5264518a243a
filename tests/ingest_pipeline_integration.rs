//! Integration tests for the ingest pipeline
//!
//! These tests validate the complete byte-to-packet workflow:
//! - Session spawn and shutdown
//! - Lossless logging vs rate-limited display delivery
//! - Live reconfiguration through commands
//! - Shared history population and eviction

mod common;

use common::{drain_at_least, synthetic_stream};
use linevis::config::{ParserConfig, Profile};
use linevis::history::PacketHistory;
use linevis::ingest::{IngestCommand, IngestSession, SourceEvent};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn spawn_default() -> (IngestSession, linevis::ingest::PacketStreams, Arc<PacketHistory>) {
    let history = Arc::new(PacketHistory::new());
    let (session, streams) = IngestSession::spawn(&Profile::default(), history.clone());
    (session, streams, history)
}

#[test]
fn test_session_spawn_and_clean_shutdown() {
    let (mut session, _streams, _history) = spawn_default();
    assert!(session.is_running());

    session.close();
    assert!(!session.is_running());
}

#[test]
fn test_logging_stream_is_lossless_and_ordered() {
    let (mut session, streams, _history) = spawn_default();

    session.feed(synthetic_stream(200, 3));
    let packets = drain_at_least(&streams.logging_rx, 200, Duration::from_secs(5));

    assert_eq!(packets.len(), 200);
    for (i, packet) in packets.iter().enumerate() {
        assert_eq!(packet.packet_index, i as u64);
        assert_eq!(packet.values.len(), 3);
        assert!(packet.is_valid);
    }

    session.close();
}

#[test]
fn test_display_stream_is_rate_limited() {
    let mut profile = Profile::default();
    profile.display.target_display_hz = 10; // 100ms interval

    let history = Arc::new(PacketHistory::new());
    let (mut session, streams) = IngestSession::spawn(&profile, history);

    let start = Instant::now();
    session.feed(synthetic_stream(500, 2));
    let logged = drain_at_least(&streams.logging_rx, 500, Duration::from_secs(5));
    let elapsed = start.elapsed();

    assert_eq!(logged.len(), 500);

    let displayed: Vec<_> = streams.display_rx.try_iter().collect();
    // At 10 Hz the limiter admits at most one packet per 100ms window,
    // plus the unconditional first packet
    let max_allowed = elapsed.as_millis() as usize / 100 + 2;
    assert!(
        displayed.len() <= max_allowed,
        "{} displayed packets exceeds limit {} for {:?}",
        displayed.len(),
        max_allowed,
        elapsed
    );
    assert!(!displayed.is_empty(), "first packet should always pass");

    session.close();
}

#[test]
fn test_rate_limit_disabled_passes_everything() {
    let mut profile = Profile::default();
    profile.display.rate_limit_enabled = false;

    let history = Arc::new(PacketHistory::new());
    let (mut session, streams) = IngestSession::spawn(&profile, history);

    session.feed(synthetic_stream(100, 1));
    let logged = drain_at_least(&streams.logging_rx, 100, Duration::from_secs(5));
    assert_eq!(logged.len(), 100);

    let displayed: Vec<_> = streams.display_rx.try_iter().collect();
    assert_eq!(displayed.len(), 100);

    session.close();
}

#[test]
fn test_raw_stream_carries_unparseable_lines() {
    let (mut session, streams, _history) = spawn_default();

    session.feed(b"1.0,2.0\nnot numbers\n3.0,4.0\n".to_vec());

    let raw = drain_at_least(&streams.raw_rx, 3, Duration::from_secs(5));
    assert_eq!(raw, vec!["1.0,2.0", "not numbers", "3.0,4.0"]);

    // Only the two parseable lines become packets
    let packets = drain_at_least(&streams.logging_rx, 2, Duration::from_secs(5));
    assert_eq!(packets.len(), 2);

    session.close();
}

#[test]
fn test_history_eviction_under_sustained_input() {
    let history = Arc::new(PacketHistory::with_capacity(50));
    let (mut session, streams) = IngestSession::spawn(&Profile::default(), history.clone());

    session.feed(synthetic_stream(120, 1));
    let packets = drain_at_least(&streams.logging_rx, 120, Duration::from_secs(5));
    assert_eq!(packets.len(), 120);

    // 120 inserts into a 50-slot ring leave packets 70..120
    assert_eq!(history.len(), 50);
    assert_eq!(history.packet_at(0).unwrap().packet_index, 70);
    assert_eq!(history.last_packet().unwrap().packet_index, 119);

    session.close();
}

#[test]
fn test_reset_discards_buffered_partial_line() {
    let (mut session, streams, _history) = spawn_default();

    session.feed(b"9.9,8".to_vec());
    thread::sleep(Duration::from_millis(100));

    session.send_command(IngestCommand::Reset);
    thread::sleep(Duration::from_millis(100));

    session.feed(b"3.0\n".to_vec());
    let packets = drain_at_least(&streams.logging_rx, 1, Duration::from_secs(5));

    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].values, vec![3.0]);

    session.close();
}

#[test]
fn test_live_parser_reconfiguration() {
    let (mut session, streams, _history) = spawn_default();

    session.feed(b"1.0,2.0\n".to_vec());
    let first = drain_at_least(&streams.logging_rx, 1, Duration::from_secs(5));
    assert_eq!(first[0].values, vec![1.0, 2.0]);

    let mut config = ParserConfig::default();
    config.delimiter = "\t".to_string();
    session.send_command(IngestCommand::SetParserConfig(config));
    thread::sleep(Duration::from_millis(100));

    session.feed(b"5.0\t6.0\n".to_vec());
    let second = drain_at_least(&streams.logging_rx, 1, Duration::from_secs(5));
    assert_eq!(second[0].values, vec![5.0, 6.0]);

    session.close();
}

#[test]
fn test_disconnect_event_resets_framing() {
    let (mut session, streams, _history) = spawn_default();
    let source = session.source_sender();

    session.feed(b"1.0,2".to_vec());
    thread::sleep(Duration::from_millis(100));

    source
        .send(SourceEvent::Connected {
            detail: "reconnect".to_string(),
        })
        .unwrap();
    session.feed(b"7.0,8.0\n".to_vec());

    let packets = drain_at_least(&streams.logging_rx, 1, Duration::from_secs(5));
    assert_eq!(packets[0].values, vec![7.0, 8.0]);

    session.close();
}

#[test]
fn test_chunked_delivery_matches_whole_delivery() {
    let (mut session, streams, _history) = spawn_default();

    // The same stream, delivered one byte at a time
    for byte in b"10.5,20.25\n30.0,40.0\n" {
        session.feed(vec![*byte]);
    }

    let packets = drain_at_least(&streams.logging_rx, 2, Duration::from_secs(5));
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0].values, vec![10.5, 20.25]);
    assert_eq!(packets[1].values, vec![30.0, 40.0]);

    session.close();
}
