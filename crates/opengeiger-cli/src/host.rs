//! Scripted host side of the simulation and its console output.
//!
//! The host thread plays the role of the PC software: it sends a
//! `MEASURE`, keeps asking for intermediate results while the device
//! counts, and acknowledges completion with a `RESET`. Responses from the
//! device are encoded into real wire frames by [`HostLink`] before being
//! summarized, so the full codec path runs on every exchange.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info};

use opengeiger_engine::driver::{ByteSource, SourceStatus};
use opengeiger_engine::wire;
use opengeiger_frame::{Checksum, FrameWriter, ResponseKind, COMMAND_MAGIC};
use opengeiger_session::{
    Personality, ResponsePort, SessionState, TableReason, TableSnapshot,
};

/// Encodes one command frame the way the host software would.
fn command_frame(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(COMMAND_MAGIC.len() + 3 + payload.len());
    out.extend_from_slice(&COMMAND_MAGIC);
    out.push(command);
    out.push(payload.len() as u8);
    out.extend_from_slice(payload);
    let mut ck = Checksum::new();
    ck.update(command);
    ck.update(payload.len() as u8);
    ck.update_slice(payload);
    out.push(ck.value());
    out
}

fn send(uart: &Sender<u8>, frame: &[u8]) {
    for &byte in frame {
        if uart.send(byte).is_err() {
            return;
        }
    }
}

/// Spawns the host script thread.
///
/// Sends `MEASURE` immediately, then an `INTERMEDIATE` every
/// `intermediate_every` until the completion signal arrives, then `RESET`.
pub fn host_script(
    uart: Sender<u8>,
    done: Receiver<()>,
    ticks_per_interval: u16,
    intermediate_every: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        send(&uart, &command_frame(b'M', &ticks_per_interval.to_le_bytes()));
        loop {
            match done.recv_timeout(intermediate_every) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    debug!("host requesting intermediate table");
                    send(&uart, &command_frame(b'I', &[]));
                }
            }
        }
        send(&uart, &command_frame(b'R', &[]));
    })
}

/// Non-blocking byte source over the channel-backed serial link.
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<u8>,
}

impl ChannelSource {
    /// Wraps the receiving end of the link.
    #[must_use]
    pub fn new(rx: Receiver<u8>) -> Self {
        Self { rx }
    }
}

impl ByteSource for ChannelSource {
    fn poll(&mut self) -> SourceStatus {
        match self.rx.try_recv() {
            Ok(byte) => SourceStatus::Byte(byte),
            Err(crossbeam::channel::TryRecvError::Empty) => SourceStatus::Idle,
            Err(crossbeam::channel::TryRecvError::Disconnected) => SourceStatus::Disconnected,
        }
    }
}

/// Device -> host response port that encodes real frames and logs them.
#[derive(Debug)]
pub struct HostLink {
    writer: FrameWriter,
    dump_frames: bool,
}

impl HostLink {
    /// Creates a link; with `dump_frames` every encoded frame is
    /// hex-dumped at debug level.
    #[must_use]
    pub fn new(dump_frames: bool) -> Self {
        Self {
            writer: FrameWriter::new(),
            dump_frames,
        }
    }

    fn transmit(&self, frame: &[u8]) {
        if self.dump_frames {
            let hex: String = frame.iter().map(|b| format!("{b:02x} ")).collect();
            debug!(len = frame.len(), "tx {}", hex.trim_end());
        }
    }
}

impl ResponsePort for HostLink {
    fn announce_state(&mut self, state: SessionState) {
        let frame = self.writer.state(state.as_str());
        self.transmit(&frame);
        info!("device state: {state}");
    }

    fn send_text(&mut self, message: &str) {
        let frame = self.writer.text(message);
        self.transmit(&frame);
        info!("device says: {message}");
    }

    fn send_personality(&mut self, personality: &Personality) {
        let payload = wire::personality_payload(personality);
        let frame = self.writer.encode(ResponseKind::PersonalityInfo, &payload);
        self.transmit(&frame);
        info!(
            name = personality.name,
            table_capacity = personality.table_capacity,
            "device personality"
        );
    }

    fn send_table(&mut self, reason: TableReason, table: &TableSnapshot) {
        let payload = wire::table_payload(reason, table);
        let frame = self.writer.encode(ResponseKind::ValueTable, &payload);
        self.transmit(&frame);
        let total: u64 = table.values.iter().map(|&v| u64::from(v)).sum();
        info!(
            ?reason,
            intervals = table.elapsed_intervals,
            total_counts = total,
            frame_bytes = frame.len(),
            "value table"
        );
    }

    fn send_params(&mut self, params: &[u8]) {
        let frame = self.writer.encode(ResponseKind::Params, params);
        self.transmit(&frame);
        info!(len = params.len(), "parameter block");
    }
}

/// Two-line readout printed to the console.
#[derive(Debug, Default)]
pub struct ConsoleScreen;

impl opengeiger_engine::DisplayPort for ConsoleScreen {
    fn render_line(&mut self, row: usize, _col: usize, text: &str) {
        info!("lcd{row}| {text}");
    }
}
