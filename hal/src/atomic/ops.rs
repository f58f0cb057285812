//! ALU operations applied by the atomic layer
//!
//! Every backend implements the same six operations. Single-instruction
//! backends (ATLD, NPS) only have add/and/or/xor in hardware; `lower`
//! rewrites the other two onto that subset so the stored result is
//! identical on every backend.

#![deny(missing_docs)]

/// Read-modify-write operation applied to an `AtomicWord`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// `old + x` (wrapping)
    Add,
    /// `old - x` (wrapping)
    Sub,
    /// `old & x`
    And,
    /// `old | x`
    Or,
    /// `old ^ x`
    Xor,
    /// `old & !x`
    AndNot,
}

impl AluOp {
    /// Every operation, in declaration order
    pub const ALL: [Self; 6] = [Self::Add, Self::Sub, Self::And, Self::Or, Self::Xor, Self::AndNot];

    /// Compute the value stored by this operation
    #[inline(always)]
    pub const fn eval(self, old: i32, operand: i32) -> i32 {
        match self {
            Self::Add => old.wrapping_add(operand),
            Self::Sub => old.wrapping_sub(operand),
            Self::And => old & operand,
            Self::Or => old | operand,
            Self::Xor => old ^ operand,
            Self::AndNot => old & !operand,
        }
    }

    /// Rewrite onto the operations single-instruction hardware provides
    #[inline(always)]
    pub const fn lower(self, operand: i32) -> (HwOp, i32) {
        match self {
            Self::Add => (HwOp::Add, operand),
            Self::Sub => (HwOp::Add, operand.wrapping_neg()),
            Self::And => (HwOp::And, operand),
            Self::Or => (HwOp::Or, operand),
            Self::Xor => (HwOp::Xor, operand),
            Self::AndNot => (HwOp::And, !operand),
        }
    }

    /// Mnemonic used in logs and benchmarks
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::AndNot => "andnot",
        }
    }
}

/// Operation encodings available as a single memory instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwOp {
    /// Atomic add
    Add,
    /// Atomic and
    And,
    /// Atomic or
    Or,
    /// Atomic xor
    Xor,
}

impl HwOp {
    /// Compute the value stored by this instruction
    #[inline(always)]
    pub const fn eval(self, old: i32, operand: i32) -> i32 {
        match self {
            Self::Add => old.wrapping_add(operand),
            Self::And => old & operand,
            Self::Or => old | operand,
            Self::Xor => old ^ operand,
        }
    }
}
