//! Single-accumulator CPU for the virtual PC.
//!
//! The machine has a 16-bit program counter, one 8-bit accumulator and a halt flag. Instructions
//! are 1, 2 or 3 bytes wide; 16-bit operands are big-endian.

mod builder;
mod cpu;
mod disasm;
pub mod isa;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod proptests;

pub use builder::ProgramBuilder;
pub use cpu::{Cpu, CpuError, RunExit, StepOutcome};
pub use disasm::disassemble;
pub use isa::{Instruction, Opcode, OperandShape};
