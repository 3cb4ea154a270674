use core::convert::Infallible;
use core::fmt;

/// Assigned opcode bytes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop = 0x00,
    LdaImm = 0x01,
    Sta = 0x02,
    LdaAbs = 0x03,
    AddImm = 0x04,
    Jmp = 0x05,
    Jz = 0x06,
    SubImm = 0x07,
    Halt = 0xFF,
}

/// Operand bytes that follow an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    None,
    Imm8,
    /// Big-endian absolute address (high byte first).
    Addr16,
}

impl OperandShape {
    /// Operand bytes following the opcode.
    pub const fn width(self) -> usize {
        match self {
            OperandShape::None => 0,
            OperandShape::Imm8 => 1,
            OperandShape::Addr16 => 2,
        }
    }
}

impl Opcode {
    pub const ALL: [Opcode; 9] = [
        Opcode::Nop,
        Opcode::LdaImm,
        Opcode::Sta,
        Opcode::LdaAbs,
        Opcode::AddImm,
        Opcode::Jmp,
        Opcode::Jz,
        Opcode::SubImm,
        Opcode::Halt,
    ];

    pub const fn from_byte(byte: u8) -> Option<Opcode> {
        Some(match byte {
            0x00 => Opcode::Nop,
            0x01 => Opcode::LdaImm,
            0x02 => Opcode::Sta,
            0x03 => Opcode::LdaAbs,
            0x04 => Opcode::AddImm,
            0x05 => Opcode::Jmp,
            0x06 => Opcode::Jz,
            0x07 => Opcode::SubImm,
            0xFF => Opcode::Halt,
            _ => return None,
        })
    }

    pub const fn byte(self) -> u8 {
        self as u8
    }

    pub const fn operand(self) -> OperandShape {
        match self {
            Opcode::Nop | Opcode::Halt => OperandShape::None,
            Opcode::LdaImm | Opcode::AddImm | Opcode::SubImm => OperandShape::Imm8,
            Opcode::Sta | Opcode::LdaAbs | Opcode::Jmp | Opcode::Jz => OperandShape::Addr16,
        }
    }

    /// Encoded width in bytes, including the opcode byte.
    pub const fn width(self) -> usize {
        1 + self.operand().width()
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::LdaImm | Opcode::LdaAbs => "LDA",
            Opcode::Sta => "STA",
            Opcode::AddImm => "ADD",
            Opcode::SubImm => "SUB",
            Opcode::Jmp => "JMP",
            Opcode::Jz => "JZ",
            Opcode::Halt => "HALT",
        }
    }
}

/// A decoded instruction.
///
/// `Unknown` carries an unassigned opcode byte. Decoding never fails on its own; it is up to the
/// executor to treat `Unknown` as a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    LdaImm(u8),
    Sta(u16),
    LdaAbs(u16),
    AddImm(u8),
    SubImm(u8),
    Jmp(u16),
    Jz(u16),
    Halt,
    Unknown(u8),
}

impl Instruction {
    pub fn opcode(&self) -> Option<Opcode> {
        Some(match self {
            Instruction::Nop => Opcode::Nop,
            Instruction::LdaImm(_) => Opcode::LdaImm,
            Instruction::Sta(_) => Opcode::Sta,
            Instruction::LdaAbs(_) => Opcode::LdaAbs,
            Instruction::AddImm(_) => Opcode::AddImm,
            Instruction::SubImm(_) => Opcode::SubImm,
            Instruction::Jmp(_) => Opcode::Jmp,
            Instruction::Jz(_) => Opcode::Jz,
            Instruction::Halt => Opcode::Halt,
            Instruction::Unknown(_) => return None,
        })
    }

    /// Encoded length in bytes. Unknown bytes occupy a single byte.
    pub fn width(&self) -> usize {
        self.opcode().map_or(1, Opcode::width)
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        let Some(opcode) = self.opcode() else {
            if let Instruction::Unknown(byte) = self {
                out.push(*byte);
            }
            return;
        };
        out.push(opcode.byte());
        match *self {
            Instruction::LdaImm(imm) | Instruction::AddImm(imm) | Instruction::SubImm(imm) => {
                out.push(imm)
            }
            Instruction::Sta(addr)
            | Instruction::LdaAbs(addr)
            | Instruction::Jmp(addr)
            | Instruction::Jz(addr) => out.extend_from_slice(&addr.to_be_bytes()),
            Instruction::Nop | Instruction::Halt | Instruction::Unknown(_) => {}
        }
    }

    fn from_parts(opcode: Opcode, operand: u16) -> Instruction {
        let imm = operand as u8;
        match opcode {
            Opcode::Nop => Instruction::Nop,
            Opcode::LdaImm => Instruction::LdaImm(imm),
            Opcode::Sta => Instruction::Sta(operand),
            Opcode::LdaAbs => Instruction::LdaAbs(operand),
            Opcode::AddImm => Instruction::AddImm(imm),
            Opcode::SubImm => Instruction::SubImm(imm),
            Opcode::Jmp => Instruction::Jmp(operand),
            Opcode::Jz => Instruction::Jz(operand),
            Opcode::Halt => Instruction::Halt,
        }
    }
}

/// Decodes the instruction introduced by `opcode`, pulling operand bytes from `fetch`.
///
/// `fetch` is called exactly as many times as the opcode's operand shape requires (zero for
/// unknown opcodes). Two-byte operands are combined high byte first.
pub fn decode_with<E>(
    opcode: u8,
    mut fetch: impl FnMut() -> Result<u8, E>,
) -> Result<Instruction, E> {
    let Some(op) = Opcode::from_byte(opcode) else {
        return Ok(Instruction::Unknown(opcode));
    };
    let operand = match op.operand() {
        OperandShape::None => 0,
        OperandShape::Imm8 => u16::from(fetch()?),
        OperandShape::Addr16 => {
            let hi = fetch()?;
            let lo = fetch()?;
            u16::from_be_bytes([hi, lo])
        }
    };
    Ok(Instruction::from_parts(op, operand))
}

/// Decodes the instruction starting at `bytes[offset]` for inspection.
///
/// Operand bytes past the end of `bytes` read as zero. Returns `None` if `offset` itself is out
/// of range.
pub fn decode_at(bytes: &[u8], offset: usize) -> Option<Instruction> {
    let opcode = *bytes.get(offset)?;
    let mut cursor = offset + 1;
    let result: Result<Instruction, Infallible> = decode_with(opcode, || {
        let b = bytes.get(cursor).copied().unwrap_or(0);
        cursor += 1;
        Ok(b)
    });
    match result {
        Ok(inst) => Some(inst),
        Err(never) => match never {},
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(op) = self.opcode() else {
            if let Instruction::Unknown(byte) = self {
                write!(f, "DB {byte:02X}")?;
            }
            return Ok(());
        };
        let mnemonic = op.mnemonic();
        match *self {
            Instruction::LdaImm(imm) | Instruction::AddImm(imm) | Instruction::SubImm(imm) => {
                write!(f, "{mnemonic} #{imm:02X}")
            }
            Instruction::Sta(addr)
            | Instruction::LdaAbs(addr)
            | Instruction::Jmp(addr)
            | Instruction::Jz(addr) => write!(f, "{mnemonic} {addr:04X}"),
            Instruction::Nop | Instruction::Halt | Instruction::Unknown(_) => f.write_str(mnemonic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_assigned_byte_round_trips_through_from_byte() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_byte(op.byte()), Some(op));
        }
        let assigned = (0u16..=0xFF)
            .filter(|&b| Opcode::from_byte(b as u8).is_some())
            .count();
        assert_eq!(assigned, Opcode::ALL.len());
    }

    #[test]
    fn widths_follow_operand_shape() {
        assert_eq!(Opcode::Nop.width(), 1);
        assert_eq!(Opcode::Halt.width(), 1);
        assert_eq!(Opcode::LdaImm.width(), 2);
        assert_eq!(Opcode::SubImm.width(), 2);
        assert_eq!(Opcode::Sta.width(), 3);
        assert_eq!(Opcode::Jz.width(), 3);
        assert_eq!(Instruction::Unknown(0x42).width(), 1);
        assert_eq!(Instruction::Jmp(0).width(), 3);
        assert_eq!(OperandShape::Imm8.width(), 1);
    }

    #[test]
    fn addresses_decode_big_endian() {
        assert_eq!(decode_at(&[0x02, 0x90, 0x01], 0), Some(Instruction::Sta(0x9001)));
        assert_eq!(decode_at(&[0x05, 0x00, 0x02], 0), Some(Instruction::Jmp(0x0002)));
    }

    #[test]
    fn unknown_opcode_fetches_no_operands() {
        let mut fetched = 0;
        let inst: Result<_, ()> = decode_with(0x42, || {
            fetched += 1;
            Ok(0)
        });
        assert_eq!(inst, Ok(Instruction::Unknown(0x42)));
        assert_eq!(fetched, 0);
    }

    #[test]
    fn truncated_operands_read_as_zero_for_inspection() {
        assert_eq!(decode_at(&[0x03, 0x80], 0), Some(Instruction::LdaAbs(0x8000)));
        assert_eq!(decode_at(&[0x01], 1), None);
    }

    #[test]
    fn encode_matches_decode() {
        let program = [
            Instruction::LdaAbs(0x8000),
            Instruction::AddImm(0x11),
            Instruction::Sta(0x8000),
            Instruction::Jz(0x1234),
            Instruction::Unknown(0x99),
            Instruction::Halt,
        ];
        let mut bytes = Vec::new();
        for inst in &program {
            inst.encode(&mut bytes);
        }
        assert_eq!(
            bytes,
            [0x03, 0x80, 0x00, 0x04, 0x11, 0x02, 0x80, 0x00, 0x06, 0x12, 0x34, 0x99, 0xFF]
        );

        let mut offset = 0;
        for expected in program {
            let inst = decode_at(&bytes, offset).unwrap();
            assert_eq!(inst, expected);
            offset += inst.width();
        }
        assert_eq!(offset, bytes.len());
    }

    #[test]
    fn display_uses_listing_syntax() {
        assert_eq!(Instruction::LdaImm(0x0A).to_string(), "LDA #0A");
        assert_eq!(Instruction::LdaAbs(0x8000).to_string(), "LDA 8000");
        assert_eq!(Instruction::Unknown(0x08).to_string(), "DB 08");
        assert_eq!(Instruction::SubImm(0xFF).to_string(), "SUB #FF");
        assert_eq!(Instruction::Jz(0x0102).to_string(), "JZ 0102");
        assert_eq!(Instruction::Halt.to_string(), "HALT");
    }
}
