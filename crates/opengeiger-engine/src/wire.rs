//! Response payload encodings.
//!
//! The frame layer frames arbitrary payloads; the layouts of the payloads
//! themselves are fixed here. Hosts decode value tables from the header
//! fields alone, so the header must be self-describing: reason, element
//! size, table type, elapsed duration and tick period all travel in front
//! of the raw table bytes.

use opengeiger_session::{Personality, TableReason, TableSnapshot};

/// Table type discriminator: one 16-bit pulse count per time interval.
pub const TABLE_TYPE_TIME_SERIES: u8 = 1;

/// Encodes a value table payload.
///
/// Layout: `[reason][element size bytes][table type][elapsed intervals
/// u16 LE][ticks per interval u16 LE][table values u16 LE each]`.
#[must_use]
pub fn table_payload(reason: TableReason, table: &TableSnapshot) -> Vec<u8> {
    let mut out = Vec::with_capacity(7 + table.values.len() * 2);
    out.push(reason.as_byte());
    out.push(2); // element size in bytes
    out.push(TABLE_TYPE_TIME_SERIES);
    out.extend_from_slice(&table.elapsed_intervals.to_le_bytes());
    out.extend_from_slice(&table.ticks_per_interval.to_le_bytes());
    for value in &table.values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Encodes a personality-info payload.
///
/// Layout: `[version][param size][bits per value][table capacity u16 LE]
/// [name bytes]`.
#[must_use]
pub fn personality_payload(personality: &Personality) -> Vec<u8> {
    let capacity = u16::try_from(personality.table_capacity).unwrap_or(u16::MAX);
    let mut out = Vec::with_capacity(5 + personality.name.len());
    out.push(personality.version);
    out.push(u8::try_from(personality.param_size).unwrap_or(u8::MAX));
    out.push(personality.bits_per_value);
    out.extend_from_slice(&capacity.to_le_bytes());
    out.extend_from_slice(personality.name.as_bytes());
    out
}
