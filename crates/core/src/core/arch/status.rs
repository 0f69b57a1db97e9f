//! Status Register.
//!
//! This module models the processor status word. It provides:
//! 1. **Flags:** Condition codes (N, V, Z) and control bits (P, S, I).
//! 2. **Packing:** Conversion to and from the 6-bit word pushed on interrupt entry.
//! 3. **Branch Conditions:** Evaluation of the sixteen conditional branch predicates.

use super::mode::Mode;

/// Interrupts enabled.
pub const STATUS_I: u32 = 0x20;
/// System mode.
pub const STATUS_S: u32 = 0x10;
/// Paging enabled.
pub const STATUS_P: u32 = 0x08;
/// Zero.
pub const STATUS_Z: u32 = 0x04;
/// Signed overflow.
pub const STATUS_V: u32 = 0x02;
/// Negative.
pub const STATUS_N: u32 = 0x01;

/// Condition codes produced by an arithmetic or logic operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// Result is negative.
    pub n: bool,
    /// Result overflowed.
    pub v: bool,
    /// Result is zero.
    pub z: bool,
}

impl Flags {
    /// Flags for a logical result: N and Z from the value, V clear.
    #[inline]
    pub const fn of(value: i32, overflow: bool) -> Self {
        Self {
            n: value < 0,
            v: overflow,
            z: value == 0,
        }
    }
}

/// The processor status register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// Negative.
    pub n: bool,
    /// Overflow.
    pub v: bool,
    /// Zero.
    pub z: bool,
    /// Paging enabled.
    pub p: bool,
    /// System mode.
    pub s: bool,
    /// Interrupts enabled.
    pub i: bool,
}

impl Default for Status {
    fn default() -> Self {
        Self::reset()
    }
}

impl Status {
    /// Reset value: system mode, everything else clear.
    pub const fn reset() -> Self {
        Self {
            n: false,
            v: false,
            z: false,
            p: false,
            s: true,
            i: false,
        }
    }

    /// The mode selected by the S flag.
    #[inline]
    pub const fn mode(&self) -> Mode {
        if self.s { Mode::System } else { Mode::User }
    }

    /// Stores condition codes.
    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.n = flags.n;
        self.v = flags.v;
        self.z = flags.z;
    }

    /// Packs the flags into the status word.
    pub const fn to_word(&self) -> u32 {
        let mut word = 0;
        if self.i {
            word |= STATUS_I;
        }
        if self.s {
            word |= STATUS_S;
        }
        if self.p {
            word |= STATUS_P;
        }
        if self.z {
            word |= STATUS_Z;
        }
        if self.v {
            word |= STATUS_V;
        }
        if self.n {
            word |= STATUS_N;
        }
        word
    }

    /// Unpacks a status word; bits above the six flags are ignored.
    pub const fn from_word(word: u32) -> Self {
        Self {
            n: word & STATUS_N != 0,
            v: word & STATUS_V != 0,
            z: word & STATUS_Z != 0,
            p: word & STATUS_P != 0,
            s: word & STATUS_S != 0,
            i: word & STATUS_I != 0,
        }
    }
}

/// The sixteen branch predicates, in opcode order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Equal (Z).
    Eq,
    /// Not equal (!Z).
    Ne,
    /// Less (N xor V).
    Lt,
    /// Less or equal (Z or (N xor V)).
    Le,
    /// Greater (!Z and !(N xor V)).
    Gt,
    /// Greater or equal (!(N xor V)).
    Ge,
    /// Overflow set.
    Vs,
    /// Overflow clear.
    Vc,
    /// Negative set.
    Ns,
    /// Negative clear.
    Nc,
    /// System mode.
    Ss,
    /// User mode.
    Sc,
    /// Interrupts enabled.
    Is,
    /// Interrupts disabled.
    Ic,
    /// Paging enabled.
    Ps,
    /// Paging disabled.
    Pc,
}

impl Condition {
    /// All predicates in opcode order.
    pub const ALL: [Self; 16] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::Vs,
        Self::Vc,
        Self::Ns,
        Self::Nc,
        Self::Ss,
        Self::Sc,
        Self::Is,
        Self::Ic,
        Self::Ps,
        Self::Pc,
    ];

    /// Evaluates the predicate against a status register.
    pub const fn holds(self, st: &Status) -> bool {
        let less = st.n ^ st.v;
        match self {
            Self::Eq => st.z,
            Self::Ne => !st.z,
            Self::Lt => less,
            Self::Le => st.z || less,
            Self::Gt => !st.z && !less,
            Self::Ge => !less,
            Self::Vs => st.v,
            Self::Vc => !st.v,
            Self::Ns => st.n,
            Self::Nc => !st.n,
            Self::Ss => st.s,
            Self::Sc => !st.s,
            Self::Is => st.i,
            Self::Ic => !st.i,
            Self::Ps => st.p,
            Self::Pc => !st.p,
        }
    }
}
