use crate::isa::Instruction;

/// Assembles a program image one instruction at a time.
///
/// ```
/// use vpc_cpu::ProgramBuilder;
///
/// let mut b = ProgramBuilder::new();
/// b.lda_imm(0x00);
/// let top = b.here();
/// b.add(0x01).jmp(top);
/// assert_eq!(b.build(), [0x01, 0x00, 0x04, 0x01, 0x05, 0x00, 0x02]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    base: u16,
    bytes: Vec<u8>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for an image that will be loaded at `base`; only affects [`ProgramBuilder::here`].
    pub fn with_base(base: u16) -> Self {
        Self {
            base,
            bytes: Vec::new(),
        }
    }

    /// Guest address of the next emitted byte.
    pub fn here(&self) -> u16 {
        self.base.wrapping_add(self.bytes.len() as u16)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn inst(&mut self, inst: Instruction) -> &mut Self {
        inst.encode(&mut self.bytes);
        self
    }

    pub fn nop(&mut self) -> &mut Self {
        self.inst(Instruction::Nop)
    }

    pub fn lda_imm(&mut self, imm: u8) -> &mut Self {
        self.inst(Instruction::LdaImm(imm))
    }

    pub fn lda(&mut self, addr: u16) -> &mut Self {
        self.inst(Instruction::LdaAbs(addr))
    }

    pub fn sta(&mut self, addr: u16) -> &mut Self {
        self.inst(Instruction::Sta(addr))
    }

    pub fn add(&mut self, imm: u8) -> &mut Self {
        self.inst(Instruction::AddImm(imm))
    }

    pub fn sub(&mut self, imm: u8) -> &mut Self {
        self.inst(Instruction::SubImm(imm))
    }

    pub fn jmp(&mut self, addr: u16) -> &mut Self {
        self.inst(Instruction::Jmp(addr))
    }

    pub fn jz(&mut self, addr: u16) -> &mut Self {
        self.inst(Instruction::Jz(addr))
    }

    pub fn halt(&mut self) -> &mut Self {
        self.inst(Instruction::Halt)
    }

    /// Emits a raw byte (data, or an unassigned opcode for fault tests).
    pub fn byte(&mut self, b: u8) -> &mut Self {
        self.bytes.push(b);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn here_tracks_load_base() {
        let mut b = ProgramBuilder::with_base(0x0100);
        assert_eq!(b.here(), 0x0100);
        b.lda_imm(1).sta(0x9000);
        assert_eq!(b.here(), 0x0105);
        assert_eq!(b.len(), 5);
    }
}
