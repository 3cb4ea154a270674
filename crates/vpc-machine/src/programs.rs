//! Built-in sample programs.
//!
//! Each sample is assembled on demand for a given load address and VRAM base so it can be
//! loaded into any valid machine layout.

use std::io;
use std::path::{Path, PathBuf};

use vpc_cpu::ProgramBuilder;

/// Address the `counter` sample stores its running count at.
pub const COUNTER_ADDRESS: u16 = 0x9000;

#[derive(Debug, Clone, Copy)]
pub struct SampleProgram {
    pub name: &'static str,
    pub description: &'static str,
    /// Bytes written from the start of VRAM.
    pub vram_bytes: usize,
    build: fn(base: u16, vram: u16) -> Vec<u8>,
}

impl SampleProgram {
    /// Assembles the program for load address `base` with VRAM at `vram`.
    pub fn image(&self, base: u16, vram: u16) -> Vec<u8> {
        (self.build)(base, vram)
    }

    pub fn file_name(&self) -> String {
        format!("{}.bin", self.name)
    }
}

pub const SAMPLES: &[SampleProgram] = &[
    SampleProgram {
        name: "demo",
        description: "busy loop incrementing the accumulator",
        vram_bytes: 0,
        build: demo,
    },
    SampleProgram {
        name: "counter",
        description: "counts upward, storing the count at 0x9000",
        vram_bytes: 0,
        build: counter,
    },
    SampleProgram {
        name: "vram-fill",
        description: "paints the first 256 VRAM bytes with 0xE0 and halts",
        vram_bytes: 256,
        build: vram_fill,
    },
    SampleProgram {
        name: "pulse",
        description: "cycles the first VRAM pixel forever",
        vram_bytes: 1,
        build: pulse,
    },
    SampleProgram {
        name: "checkerboard",
        description: "alternates 1/0 across the first 512 VRAM bytes and halts",
        vram_bytes: 512,
        build: checkerboard,
    },
];

/// Looks up a sample by name. A trailing `.bin` is ignored.
pub fn find(name: &str) -> Option<&'static SampleProgram> {
    let name = name.strip_suffix(".bin").unwrap_or(name);
    SAMPLES.iter().find(|s| s.name == name)
}

/// Writes `<name>.bin` for every sample into `dir` (created if needed), assembled for the default
/// layout (load at 0x0000, VRAM at 0x8000). Existing files are left alone.
///
/// Returns the paths that were newly written.
pub fn install_samples(dir: &Path) -> io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for sample in SAMPLES {
        let path = dir.join(sample.file_name());
        if path.try_exists()? {
            continue;
        }
        std::fs::write(&path, sample.image(0x0000, 0x8000))?;
        written.push(path);
    }
    Ok(written)
}

fn demo(base: u16, _vram: u16) -> Vec<u8> {
    let mut b = ProgramBuilder::with_base(base);
    b.lda_imm(0);
    let top = b.here();
    b.add(1).jmp(top);
    b.build()
}

fn counter(base: u16, _vram: u16) -> Vec<u8> {
    let mut b = ProgramBuilder::with_base(base);
    b.lda_imm(0);
    let top = b.here();
    b.add(1).sta(COUNTER_ADDRESS).jmp(top);
    b.build()
}

fn fill(base: u16, vram: u16, len: u16, value: impl Fn(u16) -> u8) -> Vec<u8> {
    let mut b = ProgramBuilder::with_base(base);
    for i in 0..len {
        b.lda_imm(value(i)).sta(vram.wrapping_add(i));
    }
    b.halt().build()
}

fn vram_fill(base: u16, vram: u16) -> Vec<u8> {
    fill(base, vram, 256, |_| 0xE0)
}

fn checkerboard(base: u16, vram: u16) -> Vec<u8> {
    fill(base, vram, 512, |i| if i % 2 == 0 { 1 } else { 0 })
}

fn pulse(base: u16, vram: u16) -> Vec<u8> {
    ProgramBuilder::with_base(base)
        .lda(vram)
        .add(0x11)
        .sta(vram)
        .jmp(base)
        .build()
}
