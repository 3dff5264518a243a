//! LineVis - Headless Pipeline Entry Point
//!
//! Reads a delimited telemetry stream from stdin, runs it through the
//! full ingest pipeline, and periodically logs a render summary. Pipe a
//! device stream in, for example:
//!
//! ```text
//! cat /dev/ttyUSB0 | linevis --profile profile.toml --record out.csv
//! ```

use anyhow::Context;
use linevis::config::Profile;
use linevis::history::PacketHistory;
use linevis::ingest::{IngestSession, SourceEvent};
use linevis::record::{CsvRecorder, RecorderConfig};
use linevis::render::RenderState;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct Args {
    profile: Option<PathBuf>,
    record: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        profile: None,
        record: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--profile" => {
                args.profile = Some(PathBuf::from(
                    iter.next().context("--profile requires a path")?,
                ));
            }
            "--record" => {
                args.record = Some(PathBuf::from(
                    iter.next().context("--record requires a path")?,
                ));
            }
            "--help" | "-h" => {
                eprintln!("Usage: linevis [--profile <file>] [--record <file.csv>]");
                std::process::exit(0);
            }
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,linevis=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;

    let profile = match &args.profile {
        Some(path) => {
            Profile::load(path).with_context(|| format!("loading profile {}", path.display()))?
        }
        None => Profile::default(),
    };
    tracing::info!("Using profile '{}'", profile.name);

    let history = Arc::new(PacketHistory::with_capacity(
        profile.display.history_capacity,
    ));
    let (mut session, streams) = IngestSession::spawn(&profile, history.clone());

    // Recorder drains the lossless logging stream on its own thread
    let recorder_handle = match &args.record {
        Some(path) => {
            let mut recorder = CsvRecorder::create(path, RecorderConfig::default())?;
            let logging_rx = streams.logging_rx.clone();
            Some(std::thread::spawn(move || {
                while let Ok(packet) = logging_rx.recv() {
                    if let Err(e) = recorder.record(&packet) {
                        tracing::error!("Recording failed: {}", e);
                        break;
                    }
                }
                match recorder.stop() {
                    Ok(rows) => tracing::info!("Wrote {} rows", rows),
                    Err(e) => tracing::error!("Failed to finish recording: {}", e),
                }
            }))
        }
        None => None,
    };

    // Stdin reader feeds the session in arbitrary chunks
    let source_tx = session.source_sender();
    let reader_handle = std::thread::spawn(move || {
        let _ = source_tx.send(SourceEvent::Connected {
            detail: "stdin".to_string(),
        });
        let mut stdin = std::io::stdin().lock();
        let mut buf = [0u8; 4096];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if source_tx.send(SourceEvent::Bytes(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("stdin read failed: {}", e);
                    break;
                }
            }
        }
        let _ = source_tx.send(SourceEvent::Disconnected {
            detail: "stdin eof".to_string(),
        });
    });

    // Render tick loop on the main thread
    let mut render = RenderState::new(&profile.display);
    render.set_x_axis(profile.parser.x_axis_source, profile.parser.x_axis_field_index);
    let tick_interval = Duration::from_millis(1000 / u64::from(profile.display.target_display_hz.max(1)));
    let mut last_summary = std::time::Instant::now();

    while !reader_handle.is_finished() || !streams.display_rx.is_empty() {
        std::thread::sleep(tick_interval);

        while let Ok(packet) = streams.display_rx.try_recv() {
            render.ingest(&packet);
        }
        // Raw lines are not rendered headlessly; keep the channel drained,
        // and the logging stream too when no recorder is attached
        while streams.raw_rx.try_recv().is_ok() {}
        if args.record.is_none() {
            while streams.logging_rx.try_recv().is_ok() {}
        }

        let frame = render.tick();
        if last_summary.elapsed() >= Duration::from_secs(1) {
            last_summary = std::time::Instant::now();
            let range = frame
                .y_range
                .map(|(lo, hi)| format!("[{:.3}, {:.3}]", lo, hi))
                .unwrap_or_else(|| "n/a".to_string());
            tracing::info!(
                packets = history.len(),
                channels = frame.series.len(),
                y_range = %range,
                "pipeline summary"
            );
        }
    }

    let _ = reader_handle.join();
    session.close();
    if let Some(handle) = recorder_handle {
        let _ = handle.join();
    }

    tracing::info!("Done: {} packets retained", history.len());
    Ok(())
}
