//! Collaborator interfaces of the session machine.
//!
//! The session itself owns no hardware and no transport. Everything it
//! needs from the outside world goes through these three traits:
//! responses out to the host, control over the acquisition engine, and
//! parameter persistence. Tests substitute recording fakes; the runtime
//! wires in the real engine and a serial writer.

use crate::error::SessionResult;
use crate::personality::Personality;
use crate::state::SessionState;

/// Reason tag attached to a transmitted value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TableReason {
    /// Snapshot of a still-running measurement.
    Intermediate = b'I',
    /// Final table of a measurement that ran to completion.
    Done = b'D',
    /// Final table of a measurement cut short by `ABORT`.
    Aborted = b'A',
    /// Retransmission of the final table after completion.
    Resend = b'R',
}

impl TableReason {
    /// Wire byte for this reason.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A copied-out view of the sample table at one instant.
///
/// For intermediate snapshots the copy may contain torn multi-byte
/// elements if acquisition rotated mid-copy; that inaccuracy is bounded
/// and accepted. Final snapshots are taken after acquisition is disabled
/// and are tear-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    /// Number of completed intervals the table covers.
    pub elapsed_intervals: u16,
    /// Duration of one interval in timer ticks.
    pub ticks_per_interval: u16,
    /// Per-interval pulse counts, oldest first.
    pub values: Vec<u16>,
}

/// Outbound responses to the host.
pub trait ResponsePort {
    /// Announces the session state by its ASCII tag.
    fn announce_state(&mut self, state: SessionState);

    /// Sends a best-effort diagnostic message.
    fn send_text(&mut self, message: &str);

    /// Sends the firmware personality description.
    fn send_personality(&mut self, personality: &Personality);

    /// Sends a value table tagged with `reason`.
    fn send_table(&mut self, reason: TableReason, table: &TableSnapshot);

    /// Sends the stored parameter block back to the host.
    fn send_params(&mut self, params: &[u8]);
}

/// Control surface of the acquisition engine.
pub trait MeasurementPort {
    /// Arms the interval timer and enables pulse accumulation.
    fn start(&mut self, ticks_per_interval: u16);

    /// Disables accumulation; after this the table no longer changes.
    fn finalize(&mut self);

    /// Copies out the current table. Safe to call while accumulation is
    /// live (intermediate snapshot) or after [`finalize`](Self::finalize)
    /// (final table).
    fn table(&self) -> TableSnapshot;
}

/// Opaque parameter block persistence.
pub trait ParamStore {
    /// Loads the stored parameter block.
    fn load(&mut self) -> SessionResult<Vec<u8>>;

    /// Replaces the stored parameter block.
    fn store(&mut self, params: &[u8]) -> SessionResult<()>;
}
