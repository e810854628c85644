//! Binary traces written by the instrumentation client, and replaying them
//! into an [Inspector].

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use log::debug;

use crate::error::*;
use crate::inspector::*;
use crate::load::*;
use crate::region::*;

/// Size of a single record in bytes.
pub const RECORD_SIZE: usize = 32;

/// A single record in a trace.
///
/// NOTE: The layout is kept in-sync *manually* with the instrumentation
/// client. All fields are little-endian:
///
/// | offset | size | field                                      |
/// |--------|------|--------------------------------------------|
/// | 0      | 1    | tag                                        |
/// | 1      | 1    | base register role (loads only)            |
/// | 2      | 2    | thread id                                  |
/// | 4      | 4    | width in bytes, or number of instructions  |
/// | 8      | 8    | program counter                            |
/// | 16     | 8    | effective address (loads only)             |
/// | 24     | 8    | loaded value, zero-extended (loads only)   |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceRecord {
    /// A dynamic load.
    Load { tid: u16, pc: u64, addr: u64, width: u32, role: BaseRole, value: u64 },

    /// A basic block of `ninstr` instructions starting at `pc` was executed.
    Block { tid: u16, pc: u64, ninstr: u32 },

    /// The region controller started the region of interest.
    RoiStart { tid: u16, pc: u64 },

    /// The region controller stopped the region of interest.
    RoiStop { tid: u16, pc: u64 },

    /// An instruction that needed address generation was executed.
    /// Its loads follow as separate [TraceRecord::Load] records.
    Agen { tid: u16, pc: u64 },
}
impl TraceRecord {
    const TAG_LOAD: u8      = 0;
    const TAG_BLOCK: u8     = 1;
    const TAG_ROI_START: u8 = 2;
    const TAG_ROI_STOP: u8  = 3;
    const TAG_AGEN: u8      = 4;

    /// Decode a record. `offset` is only used for error reporting.
    pub fn decode(buf: &[u8; RECORD_SIZE], offset: usize)
        -> InspectorResult<Self>
    {
        let u16_at = |i: usize| u16::from_le_bytes([buf[i], buf[i + 1]]);
        let u32_at = |i: usize| {
            u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]])
        };
        let u64_at = |i: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[i..i + 8]);
            u64::from_le_bytes(b)
        };

        let tid = u16_at(2);
        let pc  = u64_at(8);
        match buf[0] {
            Self::TAG_LOAD => {
                let role = BaseRole::from_raw(buf[1]).ok_or(
                    InspectorError::BadBaseRole { offset, role: buf[1] }
                )?;
                Ok(Self::Load {
                    tid, pc, role,
                    width: u32_at(4),
                    addr: u64_at(16),
                    value: u64_at(24),
                })
            },
            Self::TAG_BLOCK     => Ok(Self::Block { tid, pc, ninstr: u32_at(4) }),
            Self::TAG_ROI_START => Ok(Self::RoiStart { tid, pc }),
            Self::TAG_ROI_STOP  => Ok(Self::RoiStop { tid, pc }),
            Self::TAG_AGEN      => Ok(Self::Agen { tid, pc }),
            tag => Err(InspectorError::BadRecordTag { offset, tag }),
        }
    }

    /// Encode a record.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        let (tag, role, tid, word, pc, addr, value) = match *self {
            Self::Load { tid, pc, addr, width, role, value } =>
                (Self::TAG_LOAD, role as u8, tid, width, pc, addr, value),
            Self::Block { tid, pc, ninstr } =>
                (Self::TAG_BLOCK, 0, tid, ninstr, pc, 0, 0),
            Self::RoiStart { tid, pc } =>
                (Self::TAG_ROI_START, 0, tid, 0, pc, 0, 0),
            Self::RoiStop { tid, pc } =>
                (Self::TAG_ROI_STOP, 0, tid, 0, pc, 0, 0),
            Self::Agen { tid, pc } =>
                (Self::TAG_AGEN, 0, tid, 0, pc, 0, 0),
        };
        buf[0] = tag;
        buf[1] = role;
        buf[2..4].copy_from_slice(&tid.to_le_bytes());
        buf[4..8].copy_from_slice(&word.to_le_bytes());
        buf[8..16].copy_from_slice(&pc.to_le_bytes());
        buf[16..24].copy_from_slice(&addr.to_le_bytes());
        buf[24..32].copy_from_slice(&value.to_le_bytes());
        buf
    }
}

/// A list of trace files, opened one at a time.
pub struct BinaryTraceSet {
    /// A list of filenames
    pub files: Vec<String>,
    cur: usize,
}
impl BinaryTraceSet {
    pub fn new() -> Self {
        Self { files: Vec::new(), cur: 0 }
    }

    pub fn new_from_slice(strings: &[String]) -> Self {
        Self { files: strings.to_vec(), cur: 0 }
    }

    pub fn add_file(&mut self, s: impl ToString) {
        self.files.push(s.to_string());
    }
}
impl Iterator for BinaryTraceSet {
    type Item = InspectorResult<BinaryTrace>;
    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.get(self.cur)?;
        self.cur += 1;
        Some(BinaryTrace::from_file(path))
    }
}

/// A trace generated by the instrumentation client.
pub struct BinaryTrace {
    data: Vec<u8>,
    name: String,
}
impl BinaryTrace {
    /// Read a trace from a file.
    pub fn from_file(path: impl AsRef<Path>) -> InspectorResult<Self> {
        let path = path.as_ref();
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(name, data)
    }

    /// Wrap raw trace bytes.
    pub fn from_bytes(name: impl ToString, data: Vec<u8>) -> InspectorResult<Self> {
        if data.len() % RECORD_SIZE != 0 {
            return Err(InspectorError::TruncatedTrace { len: data.len() });
        }
        Ok(Self { data, name: name.to_string() })
    }

    /// Build a trace from records.
    pub fn from_records(name: impl ToString, records: &[TraceRecord]) -> Self {
        let data = records.iter().flat_map(|r| r.encode()).collect();
        Self { data, name: name.to_string() }
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.data.len() / RECORD_SIZE }

    pub fn name(&self) -> &str { &self.name }

    /// Raw bytes of the trace.
    pub fn as_bytes(&self) -> &[u8] { &self.data }

    /// Decode records in order.
    pub fn records(&self) -> impl Iterator<Item = InspectorResult<TraceRecord>> + '_ {
        self.data.chunks_exact(RECORD_SIZE).enumerate().map(|(idx, chunk)| {
            let mut buf = [0u8; RECORD_SIZE];
            buf.copy_from_slice(chunk);
            TraceRecord::decode(&buf, idx * RECORD_SIZE)
        })
    }

    /// Write the trace to a file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> InspectorResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|source| InspectorError::Create {
            path: path.to_path_buf(), source
        })?;
        let mut w = BufWriter::new(f);
        w.write_all(&self.data)?;
        w.flush()?;
        Ok(())
    }
}

/// Feed a single record to an inspector.
pub fn apply_record(insp: &Inspector, record: &TraceRecord) {
    match *record {
        TraceRecord::Load { pc, addr, width, role, value, .. } => {
            insp.capture_load(pc, addr, width, role, value);
        },
        TraceRecord::Block { ninstr, .. } => {
            insp.count_instructions(ninstr as u64);
        },
        TraceRecord::RoiStart { tid, pc } => {
            insp.control(ControlEvent::Start, tid as u32, pc);
        },
        TraceRecord::RoiStop { tid, pc } => {
            insp.control(ControlEvent::Stop, tid as u32, pc);
        },
        TraceRecord::Agen { .. } => {
            insp.count_agen();
        },
    }
}

/// Replay every record in a trace. Returns the number of records replayed.
///
/// Replay stops at the first malformed record; records before it have
/// already been applied.
pub fn replay(trace: &BinaryTrace, insp: &Inspector) -> InspectorResult<usize> {
    let mut n = 0;
    for record in trace.records() {
        apply_record(insp, &record?);
        n += 1;
    }
    debug!("replayed {} records from '{}'", n, trace.name());
    Ok(n)
}
