//! The session state machine proper.

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::SessionError;
use crate::personality::Personality;
use crate::ports::{MeasurementPort, ParamStore, ResponsePort, TableReason};
use crate::state::SessionState;

/// Why the session is demanding a device restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// The host commanded a `RESET`.
    Commanded,
    /// An invalid situation was reached; state cannot be trusted.
    Fault,
}

/// What the driver loop must do after handing the session an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SessionOutcome {
    /// Keep polling.
    Continue,
    /// Restart the device; the session is finished.
    Restart(RestartReason),
}

/// A measurement session bound to its collaborator ports.
///
/// One session lives from boot to restart. Commands not listed in the
/// transition table are no-ops that re-announce the current state, so a
/// confused host can always resynchronize by sending anything and
/// reading the announcement.
#[derive(Debug)]
pub struct Session<R, M, P> {
    state: SessionState,
    personality: Personality,
    responses: R,
    measurement: M,
    params: P,
}

impl<R, M, P> Session<R, M, P>
where
    R: ResponsePort,
    M: MeasurementPort,
    P: ParamStore,
{
    /// Creates a session in `READY` and announces it.
    pub fn new(personality: Personality, responses: R, measurement: M, params: P) -> Self {
        let mut session = Self {
            state: SessionState::Ready,
            personality,
            responses,
            measurement,
            params,
        };
        session.responses.send_personality(&session.personality);
        session.responses.announce_state(SessionState::Ready);
        session
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handles one verified command frame.
    pub fn handle_command(&mut self, command: u8, payload: &[u8]) -> SessionOutcome {
        let Some(command) = Command::from_byte(command) else {
            debug!(command, "unknown command byte, re-announcing state");
            self.responses.announce_state(self.state);
            return SessionOutcome::Continue;
        };

        match (self.state, command) {
            (_, Command::State) => {
                self.responses.announce_state(self.state);
                SessionOutcome::Continue
            }
            (SessionState::Ready | SessionState::Done, Command::Reset) => {
                info!("reset commanded");
                self.responses.send_text("RESET");
                SessionOutcome::Restart(RestartReason::Commanded)
            }
            (SessionState::Ready, Command::Measure) => self.start_measurement(payload),
            (SessionState::Ready, Command::PersonalityInfo) => {
                self.responses.send_personality(&self.personality);
                SessionOutcome::Continue
            }
            (SessionState::Ready, Command::ParamsToPersist) => {
                match self.params.store(payload) {
                    Ok(()) => self.responses.send_params(payload),
                    Err(err) => return self.fault(&err),
                }
                SessionOutcome::Continue
            }
            (SessionState::Ready, Command::ParamsFromPersist) => {
                match self.params.load() {
                    Ok(stored) => self.responses.send_params(&stored),
                    Err(err) => return self.fault(&err),
                }
                SessionOutcome::Continue
            }
            (SessionState::Measuring, Command::Intermediate) => {
                // Accumulation stays live; the snapshot tolerates tearing.
                let table = self.measurement.table();
                self.responses.send_table(TableReason::Intermediate, &table);
                SessionOutcome::Continue
            }
            (SessionState::Measuring, Command::Abort) => {
                info!("measurement aborted by host");
                self.finalize(TableReason::Aborted);
                SessionOutcome::Continue
            }
            (SessionState::Done, _) => {
                // Anything but STATE/RESET resends the final table.
                let table = self.measurement.table();
                self.responses.send_table(TableReason::Resend, &table);
                SessionOutcome::Continue
            }
            (SessionState::Error, _) => {
                self.responses.announce_state(SessionState::Error);
                SessionOutcome::Restart(RestartReason::Fault)
            }
            _ => {
                debug!(state = %self.state, ?command, "command is a no-op here");
                self.responses.announce_state(self.state);
                SessionOutcome::Continue
            }
        }
    }

    /// Handles the asynchronous "measurement finished" event.
    pub fn handle_finished(&mut self) -> SessionOutcome {
        if self.state != SessionState::Measuring {
            let err = SessionError::unexpected_finished_event(self.state);
            return self.fault(&err);
        }
        info!("measurement ran to completion");
        self.finalize(TableReason::Done);
        SessionOutcome::Continue
    }

    /// Reports a protocol violation detected below the session layer.
    ///
    /// Framing errors (bad length, checksum mismatch) mean residual
    /// session state cannot be trusted either, so they converge on the
    /// same diagnostic-then-restart path as session faults.
    pub fn protocol_fault(&mut self, diagnostic: &str) -> SessionOutcome {
        warn!(diagnostic, "protocol violation, forcing restart");
        self.responses.send_text(diagnostic);
        self.state = SessionState::Error;
        self.responses.announce_state(SessionState::Error);
        SessionOutcome::Restart(RestartReason::Fault)
    }

    fn start_measurement(&mut self, payload: &[u8]) -> SessionOutcome {
        if payload.len() != self.personality.param_size {
            let err =
                SessionError::invalid_payload_length(self.personality.param_size, payload.len());
            return self.fault(&err);
        }
        let ticks = u16::from_le_bytes([payload[0], payload[1]]);
        info!(ticks_per_interval = ticks, "starting measurement");
        self.measurement.start(ticks);
        self.state = SessionState::Measuring;
        self.responses.announce_state(SessionState::Measuring);
        SessionOutcome::Continue
    }

    fn finalize(&mut self, reason: TableReason) {
        // Disable accumulation first so the final table is tear-free.
        self.measurement.finalize();
        let table = self.measurement.table();
        self.responses.send_table(reason, &table);
        self.state = SessionState::Done;
        self.responses.announce_state(SessionState::Done);
    }

    fn fault(&mut self, err: &SessionError) -> SessionOutcome {
        warn!(%err, "session fault, forcing restart");
        self.responses.send_text(&err.to_string());
        self.state = SessionState::Error;
        self.responses.announce_state(SessionState::Error);
        SessionOutcome::Restart(RestartReason::Fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TableSnapshot;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        State(SessionState),
        Text(String),
        Personality(&'static str),
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
        fn send_personality(&mut self, personality: &Personality) {
            self.0.borrow_mut().push(Sent::Personality(personality.name));
        }
        fn send_table(&mut self, reason: TableReason, table: &TableSnapshot) {
            self.0.borrow_mut().push(Sent::Table(reason, table.clone()));
        }
        fn send_params(&mut self, params: &[u8]) {
            self.0.borrow_mut().push(Sent::Params(params.to_vec()));
        }
    }

    #[derive(Default)]
    struct FakeEngine {
        started_with: Option<u16>,
        finalized: bool,
        elapsed: u16,
        values: Vec<u16>,
    }

    impl MeasurementPort for FakeEngine {
        fn start(&mut self, ticks_per_interval: u16) {
            self.started_with = Some(ticks_per_interval);
        }
        fn finalize(&mut self) {
            self.finalized = true;
        }
        fn table(&self) -> TableSnapshot {
            TableSnapshot {
                elapsed_intervals: self.elapsed,
                ticks_per_interval: self.started_with.unwrap_or(0),
                values: self.values.clone(),
            }
        }
    }

    #[derive(Default)]
    struct MemStore(Vec<u8>);

    impl ParamStore for MemStore {
        fn load(&mut self) -> crate::SessionResult<Vec<u8>> {
            Ok(self.0.clone())
        }
        fn store(&mut self, params: &[u8]) -> crate::SessionResult<()> {
            self.0 = params.to_vec();
            Ok(())
        }
    }

    type TestSession = Session<Recorder, FakeEngine, MemStore>;

    fn new_session() -> (TestSession, Rc<RefCell<Vec<Sent>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let session = Session::new(
            Personality::geiger_time_series(600),
            Recorder(Rc::clone(&log)),
            FakeEngine::default(),
            MemStore::default(),
        );
        log.borrow_mut().clear();
        (session, log)
    }

    #[test]
    fn boot_announces_personality_then_ready() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let session = Session::new(
            Personality::geiger_time_series(600),
            Recorder(Rc::clone(&log)),
            FakeEngine::default(),
            MemStore::default(),
        );
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(
            *log.borrow(),
            vec![
                Sent::Personality("geiger-time-series"),
                Sent::State(SessionState::Ready),
            ]
        );
    }

    #[test]
    fn measure_with_valid_payload_starts_and_announces_measuring() {
        let (mut session, log) = new_session();
        let outcome = session.handle_command(b'M', &300u16.to_le_bytes());
        assert_eq!(outcome, SessionOutcome::Continue);
        assert_eq!(session.state(), SessionState::Measuring);
        assert_eq!(session.measurement.started_with, Some(300));
        assert_eq!(*log.borrow(), vec![Sent::State(SessionState::Measuring)]);
    }

    #[test]
    fn intermediate_reflects_elapsed_intervals_and_stays_measuring() {
        let (mut session, log) = new_session();
        let _ = session.handle_command(b'M', &300u16.to_le_bytes());
        session.measurement.elapsed = 3;
        session.measurement.values = vec![4, 7, 2];
        log.borrow_mut().clear();

        let outcome = session.handle_command(b'I', &[]);
        assert_eq!(outcome, SessionOutcome::Continue);
        assert_eq!(session.state(), SessionState::Measuring);
        assert!(!session.measurement.finalized);
        match &log.borrow()[0] {
            Sent::Table(TableReason::Intermediate, table) => {
                assert_eq!(table.elapsed_intervals, 3);
                assert_eq!(table.values, vec![4, 7, 2]);
            }
            other => panic!("expected intermediate table, got {other:?}"),
        }
    }

    #[test]
    fn measure_with_wrong_payload_length_faults() {
        let (mut session, log) = new_session();
        let outcome = session.handle_command(b'M', &[1, 2, 3]);
        assert_eq!(outcome, SessionOutcome::Restart(RestartReason::Fault));
        assert_eq!(session.state(), SessionState::Error);
        assert!(matches!(log.borrow()[0], Sent::Text(_)));
    }

    #[test]
    fn abort_finalizes_before_snapshotting() {
        let (mut session, log) = new_session();
        let _ = session.handle_command(b'M', &100u16.to_le_bytes());
        log.borrow_mut().clear();

        let outcome = session.handle_command(b'A', &[]);
        assert_eq!(outcome, SessionOutcome::Continue);
        assert_eq!(session.state(), SessionState::Done);
        assert!(session.measurement.finalized);
        assert!(matches!(
            log.borrow()[0],
            Sent::Table(TableReason::Aborted, _)
        ));
        assert_eq!(log.borrow()[1], Sent::State(SessionState::Done));
    }

    #[test]
    fn finished_event_finalizes_with_done_tag() {
        let (mut session, log) = new_session();
        let _ = session.handle_command(b'M', &100u16.to_le_bytes());
        log.borrow_mut().clear();

        let outcome = session.handle_finished();
        assert_eq!(outcome, SessionOutcome::Continue);
        assert_eq!(session.state(), SessionState::Done);
        assert!(matches!(log.borrow()[0], Sent::Table(TableReason::Done, _)));
    }

    #[test]
    fn finished_event_outside_measuring_faults() {
        let (mut session, _log) = new_session();
        let outcome = session.handle_finished();
        assert_eq!(outcome, SessionOutcome::Restart(RestartReason::Fault));
        assert_eq!(session.state(), SessionState::Error);
    }

    #[test]
    fn done_resends_final_table_for_stray_commands() {
        let (mut session, log) = new_session();
        let _ = session.handle_command(b'M', &100u16.to_le_bytes());
        let _ = session.handle_finished();
        log.borrow_mut().clear();

        let outcome = session.handle_command(b'M', &100u16.to_le_bytes());
        assert_eq!(outcome, SessionOutcome::Continue);
        assert_eq!(session.state(), SessionState::Done);
        assert!(matches!(
            log.borrow()[0],
            Sent::Table(TableReason::Resend, _)
        ));
    }

    #[test]
    fn reset_in_done_restarts() {
        let (mut session, _log) = new_session();
        let _ = session.handle_command(b'M', &100u16.to_le_bytes());
        let _ = session.handle_finished();
        let outcome = session.handle_command(b'R', &[]);
        assert_eq!(outcome, SessionOutcome::Restart(RestartReason::Commanded));
    }

    #[test]
    fn state_command_reannounces_in_every_state() {
        let (mut session, log) = new_session();
        let _ = session.handle_command(b'S', &[]);
        assert_eq!(*log.borrow(), vec![Sent::State(SessionState::Ready)]);

        let _ = session.handle_command(b'M', &100u16.to_le_bytes());
        log.borrow_mut().clear();
        let _ = session.handle_command(b'S', &[]);
        assert_eq!(*log.borrow(), vec![Sent::State(SessionState::Measuring)]);
    }

    #[test]
    fn params_round_trip_through_the_store() {
        let (mut session, log) = new_session();
        let _ = session.handle_command(b'E', &[9, 8, 7]);
        let _ = session.handle_command(b'F', &[]);
        let sent = log.borrow();
        assert_eq!(sent[0], Sent::Params(vec![9, 8, 7]));
        assert_eq!(sent[1], Sent::Params(vec![9, 8, 7]));
    }

    #[test]
    fn unknown_command_byte_reannounces_state() {
        let (mut session, log) = new_session();
        let outcome = session.handle_command(b'Z', &[]);
        assert_eq!(outcome, SessionOutcome::Continue);
        assert_eq!(*log.borrow(), vec![Sent::State(SessionState::Ready)]);
    }

    #[test]
    fn abort_in_ready_is_a_noop() {
        let (mut session, log) = new_session();
        let outcome = session.handle_command(b'A', &[]);
        assert_eq!(outcome, SessionOutcome::Continue);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(*log.borrow(), vec![Sent::State(SessionState::Ready)]);
    }
}
