use thiserror::Error;
use vpc_mem::{MemoryError, Ram};

use crate::isa::{self, Instruction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    /// `pc` is the address the opcode byte was fetched from.
    #[error("unknown opcode 0x{opcode:02X} at PC=0x{pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// A fetch, load or store hit an address outside RAM.
    #[error("memory fault in instruction at PC=0x{pc:04X}: {source}")]
    Memory {
        pc: u16,
        #[source]
        source: MemoryError,
    },
}

impl CpuError {
    /// Address of the instruction that faulted.
    pub fn pc(&self) -> u16 {
        match self {
            CpuError::IllegalOpcode { pc, .. } | CpuError::Memory { pc, .. } => *pc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Executed(Instruction),
    /// The CPU was already halted; nothing happened.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunExit {
    /// The step budget was exhausted while running.
    Completed { executed: u64 },
    Halted { executed: u64 },
    /// A step failed. CPU state is left as the failing step left it.
    Fault { executed: u64, error: CpuError },
}

impl RunExit {
    pub fn executed(&self) -> u64 {
        match self {
            RunExit::Completed { executed }
            | RunExit::Halted { executed }
            | RunExit::Fault { executed, .. } => *executed,
        }
    }
}

/// Register file plus the fetch/decode/execute loop.
///
/// The CPU does not own RAM; every step borrows it, so a host layer can load new program bytes
/// between steps and then [`Cpu::reboot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cpu {
    pc: u16,
    acc: u8,
    halted: bool,
}

impl Cpu {
    pub fn new(boot_address: usize) -> Self {
        let mut cpu = Self::default();
        cpu.reboot(boot_address);
        cpu
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn acc(&self) -> u8 {
        self.acc
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Stops execution until the next [`Cpu::reboot`].
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Restarts execution at `boot_address` (mod 64KiB) with a cleared accumulator.
    ///
    /// RAM is not touched.
    pub fn reboot(&mut self, boot_address: usize) {
        self.pc = (boot_address & 0xFFFF) as u16;
        self.acc = 0;
        self.halted = false;
    }

    pub fn step(&mut self, ram: &mut Ram) -> Result<StepOutcome, CpuError> {
        if self.halted {
            return Ok(StepOutcome::Idle);
        }

        let pc = self.pc;
        let fault = move |source: MemoryError| CpuError::Memory { pc, source };

        let opcode = self.fetch_u8(ram).map_err(fault)?;
        let inst = isa::decode_with(opcode, || self.fetch_u8(ram)).map_err(fault)?;

        match inst {
            Instruction::Nop => {}
            Instruction::LdaImm(imm) => self.acc = imm,
            Instruction::Sta(addr) => ram.write_u8(addr.into(), self.acc).map_err(fault)?,
            Instruction::LdaAbs(addr) => self.acc = ram.read_u8(addr.into()).map_err(fault)?,
            Instruction::AddImm(imm) => self.acc = self.acc.wrapping_add(imm),
            Instruction::SubImm(imm) => self.acc = self.acc.wrapping_sub(imm),
            Instruction::Jmp(addr) => self.pc = addr,
            Instruction::Jz(addr) => {
                if self.acc == 0 {
                    self.pc = addr;
                }
            }
            Instruction::Halt => self.halted = true,
            Instruction::Unknown(opcode) => return Err(CpuError::IllegalOpcode { opcode, pc }),
        }
        Ok(StepOutcome::Executed(inst))
    }

    /// Executes up to `budget` instructions, stopping early on `HALT` or a fault.
    pub fn run(&mut self, ram: &mut Ram, budget: u64) -> RunExit {
        let mut executed = 0u64;
        while executed < budget {
            if self.halted {
                return RunExit::Halted { executed };
            }
            match self.step(ram) {
                Ok(_) => executed += 1,
                Err(error) => return RunExit::Fault { executed, error },
            }
        }
        if self.halted {
            RunExit::Halted { executed }
        } else {
            RunExit::Completed { executed }
        }
    }

    fn fetch_u8(&mut self, ram: &Ram) -> Result<u8, MemoryError> {
        let value = ram.read_u8(self.pc.into())?;
        self.pc = self.pc.wrapping_add(1);
        Ok(value)
    }
}
