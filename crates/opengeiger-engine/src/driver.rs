//! Main-loop protocol driver.
//!
//! One [`Driver`] owns the frame parser, the session machine and the
//! inbound byte source, and advances them one step per
//! [`poll_once`](Driver::poll_once) call. The host process interleaves
//! these calls with timer/pulse simulation and display updates, which
//! keeps the loop shape of the device: poll flags, poll bytes, repeat,
//! nothing ever blocks.

use std::sync::Arc;

use tracing::{debug, info};

use opengeiger_frame::FrameParser;
use opengeiger_session::{ParamStore, ResponsePort, Session, SessionOutcome};

use crate::acquisition::{Acquisition, AcquisitionHandle};

/// One poll of the inbound byte source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// A byte arrived.
    Byte(u8),
    /// Nothing pending right now.
    Idle,
    /// The peer went away; no more bytes will ever arrive.
    Disconnected,
}

/// Non-blocking inbound byte stream.
pub trait ByteSource {
    /// Polls for at most one byte.
    fn poll(&mut self) -> SourceStatus;
}

/// What the outer loop must do after one driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum DriverStep {
    /// Keep going.
    Continue,
    /// Restart the device: tear everything down and boot a new session.
    Restart,
    /// The byte source is gone; there is nothing left to drive.
    Disconnected,
}

/// Protocol driver binding a session to its byte source.
#[derive(Debug)]
pub struct Driver<R, P, B> {
    session: Session<R, AcquisitionHandle, P>,
    parser: FrameParser,
    acquisition: Arc<Acquisition>,
    source: B,
}

impl<R, P, B> Driver<R, P, B>
where
    R: ResponsePort,
    P: ParamStore,
    B: ByteSource,
{
    /// Binds a freshly booted session to `source`.
    ///
    /// `min_payload` is the smallest nonzero command payload the
    /// personality admits, handed down to the frame parser.
    pub fn new(
        session: Session<R, AcquisitionHandle, P>,
        acquisition: Arc<Acquisition>,
        source: B,
        min_payload: u8,
    ) -> Self {
        Self {
            session,
            parser: FrameParser::new(min_payload),
            acquisition,
            source,
        }
    }

    /// The session, for state inspection.
    #[must_use]
    pub fn session(&self) -> &Session<R, AcquisitionHandle, P> {
        &self.session
    }

    /// Advances the main loop by one step.
    ///
    /// Checks the finished flag first so a measurement that completed
    /// while bytes were queued finalizes before the next command is
    /// interpreted, then consumes at most one inbound byte.
    pub fn poll_once(&mut self) -> DriverStep {
        if self.acquisition.take_finished() {
            if let SessionOutcome::Restart(reason) = self.session.handle_finished() {
                info!(?reason, "restart requested at finalization");
                return DriverStep::Restart;
            }
        }

        match self.source.poll() {
            SourceStatus::Disconnected => DriverStep::Disconnected,
            SourceStatus::Idle => DriverStep::Continue,
            SourceStatus::Byte(byte) => match self.parser.push_byte(byte) {
                Ok(None) => DriverStep::Continue,
                Ok(Some(frame)) => {
                    debug!(command = frame.command, len = frame.payload.len(), "frame dispatched");
                    match self.session.handle_command(frame.command, &frame.payload) {
                        SessionOutcome::Continue => DriverStep::Continue,
                        SessionOutcome::Restart(reason) => {
                            info!(?reason, "restart requested by session");
                            DriverStep::Restart
                        }
                    }
                }
                Err(err) => match self.session.protocol_fault(&err.to_string()) {
                    SessionOutcome::Continue => DriverStep::Continue,
                    SessionOutcome::Restart(reason) => {
                        info!(?reason, "restart requested after protocol fault");
                        DriverStep::Restart
                    }
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{EngineConfig, TimerMode};
    use opengeiger_frame::{Checksum, COMMAND_MAGIC};
    use opengeiger_session::{
        Personality, SessionResult, SessionState, TableReason, TableSnapshot,
    };
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        State(SessionState),
        Text(String),
        Personality,
        Table(TableReason, TableSnapshot),
        Params(Vec<u8>),
    }

    #[derive(Default)]
    struct Recorder(Rc<RefCell<Vec<Sent>>>);

    impl ResponsePort for Recorder {
        fn announce_state(&mut self, state: SessionState) {
            self.0.borrow_mut().push(Sent::State(state));
        }
        fn send_text(&mut self, message: &str) {
            self.0.borrow_mut().push(Sent::Text(message.to_owned()));
        }
        fn send_personality(&mut self, _personality: &Personality) {
            self.0.borrow_mut().push(Sent::Personality);
        }
        fn send_table(&mut self, reason: TableReason, table: &TableSnapshot) {
            self.0.borrow_mut().push(Sent::Table(reason, table.clone()));
        }
        fn send_params(&mut self, params: &[u8]) {
            self.0.borrow_mut().push(Sent::Params(params.to_vec()));
        }
    }

    #[derive(Default)]
    struct MemStore(Vec<u8>);

    impl ParamStore for MemStore {
        fn load(&mut self) -> SessionResult<Vec<u8>> {
            Ok(self.0.clone())
        }
        fn store(&mut self, params: &[u8]) -> SessionResult<()> {
            self.0 = params.to_vec();
            Ok(())
        }
    }

    struct Script(VecDeque<u8>);

    impl ByteSource for Script {
        fn poll(&mut self) -> SourceStatus {
            match self.0.pop_front() {
                Some(b) => SourceStatus::Byte(b),
                None => SourceStatus::Disconnected,
            }
        }
    }

    fn encode(command: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
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

    fn boot(
        table_capacity: usize,
        script: Vec<u8>,
    ) -> (Driver<Recorder, MemStore, Script>, Rc<RefCell<Vec<Sent>>>, Arc<Acquisition>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let config = EngineConfig {
            table_capacity,
            mode: TimerMode::IntervalRotation,
            ..EngineConfig::default()
        };
        let acquisition = Arc::new(Acquisition::new(&config));
        let session = Session::new(
            Personality::geiger_time_series(table_capacity),
            Recorder(Rc::clone(&log)),
            AcquisitionHandle::new(Arc::clone(&acquisition)),
            MemStore::default(),
        );
        let driver = Driver::new(session, Arc::clone(&acquisition), Script(script.into()), 2);
        (driver, log, acquisition)
    }

    fn drive_to_end(driver: &mut Driver<Recorder, MemStore, Script>) -> DriverStep {
        loop {
            match driver.poll_once() {
                DriverStep::Continue => {}
                other => return other,
            }
        }
    }

    #[test]
    fn full_measurement_runs_to_done() {
        let mut script = encode(b'M', &2u16.to_le_bytes());
        let (mut driver, log, acquisition) = boot(2, script.drain(..).collect());

        while driver.session().state() == SessionState::Ready {
            assert_eq!(driver.poll_once(), DriverStep::Continue);
        }
        assert_eq!(driver.session().state(), SessionState::Measuring);

        // Two intervals of two ticks each fill the table.
        for pulses in [3u32, 5] {
            for _ in 0..pulses {
                acquisition.on_pulse();
            }
            acquisition.on_tick();
            acquisition.on_tick();
        }

        // Next poll sees the finished flag and finalizes.
        assert_eq!(driver.poll_once(), DriverStep::Disconnected);
        assert_eq!(driver.session().state(), SessionState::Done);
        let sent = log.borrow();
        let table = sent.iter().find_map(|s| match s {
            Sent::Table(TableReason::Done, table) => Some(table.clone()),
            _ => None,
        });
        assert_eq!(table.map(|t| t.values), Some(vec![3, 5]));
    }

    #[test]
    fn bad_length_byte_forces_restart_without_reading_payload() {
        let mut script = COMMAND_MAGIC.to_vec();
        script.push(b'M');
        script.push(200);
        // Deliberately no payload bytes follow.
        let (mut driver, log, _acq) = boot(4, script);

        assert_eq!(drive_to_end(&mut driver), DriverStep::Restart);
        assert_eq!(driver.session().state(), SessionState::Error);
        assert!(log
            .borrow()
            .iter()
            .any(|s| matches!(s, Sent::Text(msg) if msg.contains("200"))));
    }

    #[test]
    fn checksum_mismatch_forces_restart() {
        let mut script = encode(b'S', &[]);
        let last = script.len() - 1;
        script[last] ^= 0x10;
        let (mut driver, log, _acq) = boot(4, script);
        assert_eq!(drive_to_end(&mut driver), DriverStep::Restart);

        // Fault handling ran to completion: diagnostic text out, session
        // parked in the error state pending the restart.
        assert_eq!(driver.session().state(), SessionState::Error);
        assert!(log
            .borrow()
            .iter()
            .any(|s| matches!(s, Sent::Text(msg) if msg.contains("checksum"))));
    }

    #[test]
    fn line_noise_between_frames_is_ignored() {
        let mut script = vec![0xDE, 0xAD, 0xBE, 0xEF];
        script.extend_from_slice(&encode(b'S', &[]));
        let (mut driver, log, _acq) = boot(4, script);
        assert_eq!(drive_to_end(&mut driver), DriverStep::Disconnected);
        assert_eq!(
            *log.borrow().last().unwrap(),
            Sent::State(SessionState::Ready)
        );
    }

    #[test]
    fn reset_command_requests_restart() {
        let script = encode(b'R', &[]);
        let (mut driver, _log, _acq) = boot(4, script);
        assert_eq!(drive_to_end(&mut driver), DriverStep::Restart);
    }
}
