//! Assembling synthetic load traces.

use rand::prelude::*;

use crate::load::*;
use crate::memory::*;
use crate::trace::*;

/// Length of every synthetic instruction in bytes.
const ILEN: u64 = 4;

/// A pre-determined pattern of addresses and values for a load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPattern {
    /// Always reads this value from the same address.
    Stable(u64),

    /// Reads zero from the same address, until the n-th execution
    /// (counting from one) and every execution after it read one.
    /// The first execution has nothing to differ from, so any n below
    /// two changes at the second execution.
    ChangesAt(usize),

    /// Reads the same value, but the address advances by some stride
    /// on every execution.
    Strided(u64),

    /// Reads a random value from the same address.
    Random,
}

/// A load instruction in a synthetic program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SynthLoad {
    pub pc: u64,
    pub addr: u64,
    pub width: u32,
    pub role: BaseRole,
    pub pattern: LoadPattern,
}
impl SynthLoad {
    /// Generate the address and value for the `ctr`-th execution
    /// (counting from zero).
    fn access(&self, ctr: usize, rng: &mut impl Rng) -> (u64, u64) {
        let (addr, value) = match self.pattern {
            LoadPattern::Stable(v) => (self.addr, v),
            LoadPattern::ChangesAt(n) => {
                (self.addr, if ctr + 1 >= n.max(2) { 1 } else { 0 })
            },
            LoadPattern::Strided(stride) => {
                (self.addr.wrapping_add(stride.wrapping_mul(ctr as u64)), 0)
            },
            LoadPattern::Random => (self.addr, rng.gen()),
        };
        (addr, truncate_value(value, self.width))
    }
}

/// Used to assemble a loop of loads and unroll it into a trace.
#[derive(Debug)]
pub struct TraceAssembler {
    /// The loads in program order
    ops: Vec<SynthLoad>,

    /// The initial address/program counter value.
    base: u64,

    /// State tracking the program counter value during assembly.
    cursor: u64,

    /// Thread id stamped on every record
    tid: u16,

    rng: StdRng,
}
impl TraceAssembler {
    /// Create a new assembler. `seed` drives [LoadPattern::Random].
    pub fn new(base: u64, seed: u64) -> Self {
        Self {
            ops: Vec::new(),
            base,
            cursor: base,
            tid: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn set_tid(&mut self, tid: u16) { self.tid = tid; }

    /// Emit a load and return its program counter value.
    pub fn load(&mut self, addr: u64, width: u32, role: BaseRole,
        pattern: LoadPattern) -> u64
    {
        let pc = self.cursor;
        self.ops.push(SynthLoad { pc, addr, width, role, pattern });
        self.cursor += ILEN;
        pc
    }

    /// Increment the program counter by some value.
    pub fn pad(&mut self, len: u64) {
        self.cursor += len;
    }

    /// Increment and align the program counter to some power of two.
    pub fn pad_align(&mut self, aln: u64) {
        assert!(aln.is_power_of_two());
        let mask = aln - 1;
        self.cursor = (self.cursor + mask) & !mask;
    }

    /// The loads emitted so far.
    pub fn loads(&self) -> &[SynthLoad] { &self.ops }

    /// Unroll the program into a trace of `iters` loop iterations, wrapped
    /// in a region of interest.
    pub fn compile(&mut self, iters: usize) -> Vec<TraceRecord> {
        let tid = self.tid;
        let mut res = Vec::with_capacity(2 + iters * (self.ops.len() + 1));
        res.push(TraceRecord::RoiStart { tid, pc: self.base });
        for ctr in 0..iters {
            res.push(TraceRecord::Block {
                tid, pc: self.base, ninstr: self.ops.len() as u32
            });
            for op in self.ops.iter() {
                let (addr, value) = op.access(ctr, &mut self.rng);
                res.push(TraceRecord::Load {
                    tid, pc: op.pc, addr, width: op.width, role: op.role, value
                });
            }
        }
        res.push(TraceRecord::RoiStop { tid, pc: self.cursor });
        res
    }
}
