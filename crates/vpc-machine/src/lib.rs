//! The virtual PC: RAM, CPU and memory-mapped video wired together, plus the program
//! loader/reboot protocol and a per-tick driver.
//!
//! All state is single-threaded. A host drives the machine by calling [`Machine::tick`] (or the
//! finer-grained [`Machine::run_slice`], [`Machine::present`] and [`Machine::render_frame`]) and
//! may call [`Machine::load_program`] between ticks to hot-swap the running program.

mod config;
pub mod programs;
mod status;

pub use config::{ConfigError, MachineConfig, VideoSource};
pub use status::{draw_status, StatusInfo};
pub use vpc_cpu::{Cpu, CpuError, RunExit};
pub use vpc_mem::{MemoryError, Ram};
pub use vpc_video::{DisplayOutput, DisplaySampler, FrameSurface};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("invalid machine configuration: {0}")]
    Config(#[from] ConfigError),

    /// The image does not fit in RAM at the load address. Nothing was written and the CPU was
    /// not rebooted.
    #[error("program image ({len} bytes) does not fit at load address 0x{load_address:04X}")]
    ProgramTooLarge {
        len: usize,
        load_address: usize,
        #[source]
        source: MemoryError,
    },

    #[error("unknown sample program {0:?}")]
    UnknownProgram(String),

    #[error("VRAM at 0x{0:x} is not reachable by 16-bit guest addresses")]
    VramNotGuestAddressable(usize),

    #[error("sample program {name:?} draws {needs} bytes but the VRAM window holds {vram_len}")]
    SampleDoesNotFit {
        name: &'static str,
        needs: usize,
        vram_len: usize,
    },

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

pub type Result<T> = std::result::Result<T, MachineError>;

/// Outcome of one [`Machine::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub exit: RunExit,
    /// Whether the sampled display differs from the previous tick.
    pub frame_changed: bool,
}

pub struct Machine {
    config: MachineConfig,
    ram: Ram,
    cpu: Cpu,
    surface: FrameSurface,
    display: DisplaySampler,
    rom: Vec<u8>,
    ticks: u64,
    last_fault: Option<CpuError>,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Result<Self> {
        config.validate()?;
        let ram = Ram::new(config.ram_size)?;
        Ok(Self {
            cpu: Cpu::new(config.load_address),
            surface: FrameSurface::new(config.width, config.height),
            display: DisplaySampler::new(config.width, config.height, config.vram_start),
            ram,
            rom: Vec::new(),
            ticks: 0,
            last_fault: None,
            config,
        })
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    /// Direct RAM access for host layers (e.g. poking VRAM or patching a running program).
    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn surface(&self) -> &FrameSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut FrameSurface {
        &mut self.surface
    }

    pub fn display(&self) -> &DisplaySampler {
        &self.display
    }

    /// The most recently loaded program image.
    pub fn rom_image(&self) -> &[u8] {
        &self.rom
    }

    pub fn rom_len(&self) -> usize {
        self.rom.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The fault that stopped the CPU, if it is currently stopped by one.
    pub fn last_fault(&self) -> Option<&CpuError> {
        self.last_fault.as_ref()
    }

    /// Installs `image` at the configured load address and reboots the CPU into it.
    ///
    /// The copy and the reboot form one unit: if the image does not fit, RAM and CPU state are
    /// left exactly as they were. Only the bytes covered by `image` are replaced; the rest of
    /// RAM (including VRAM and any data the previous program left behind) is preserved.
    pub fn load_program(&mut self, image: &[u8]) -> Result<()> {
        let load_address = self.config.load_address;
        self.ram
            .write_block(load_address, image)
            .map_err(|source| MachineError::ProgramTooLarge {
                len: image.len(),
                load_address,
                source,
            })?;
        self.rom = image.to_vec();
        self.reboot();
        debug!(len = image.len(), load_address, "program loaded");
        Ok(())
    }

    /// Builds the named sample for this machine's layout and loads it.
    ///
    /// Samples that draw must fit inside the VRAM window, and every byte they draw must be
    /// reachable by a 16-bit address.
    pub fn load_sample(&mut self, name: &str) -> Result<()> {
        let sample =
            programs::find(name).ok_or_else(|| MachineError::UnknownProgram(name.to_string()))?;
        let vram_start = self.config.vram_start;
        let vram_len = self.config.vram_len().unwrap_or(usize::MAX);
        if sample.vram_bytes > vram_len {
            return Err(MachineError::SampleDoesNotFit {
                name: sample.name,
                needs: sample.vram_bytes,
                vram_len,
            });
        }
        let end = vram_start.saturating_add(sample.vram_bytes);
        let vram = u16::try_from(vram_start)
            .ok()
            .filter(|_| end <= 0x1_0000)
            .ok_or(MachineError::VramNotGuestAddressable(vram_start))?;
        // `validate` guarantees the load address fits in 16 bits.
        let base = self.config.load_address as u16;
        let image = sample.image(base, vram);
        self.load_program(&image)
    }

    /// Restarts the current program from the load address without touching RAM.
    pub fn reboot(&mut self) {
        self.cpu.reboot(self.config.load_address);
        self.last_fault = None;
        debug!(pc = self.cpu.pc(), "cpu rebooted");
    }

    /// Runs the CPU for at most `max_insts` instructions.
    ///
    /// A fault halts the CPU (until the next reboot or program load) and is returned in
    /// [`RunExit::Fault`].
    pub fn run_slice(&mut self, max_insts: u64) -> RunExit {
        let exit = self.cpu.run(&mut self.ram, max_insts);
        if let RunExit::Fault { error, executed } = &exit {
            warn!(pc = error.pc(), executed, "guest fault, halting CPU: {error}");
            self.cpu.halt();
            self.last_fault = Some(error.clone());
        }
        exit
    }

    /// Copies the host back buffer into the VRAM window.
    pub fn present(&mut self) -> Result<()> {
        self.surface.present(&mut self.ram, self.config.vram_start)?;
        Ok(())
    }

    /// Samples VRAM into the display grid, returning whether anything changed.
    pub fn render_frame(&mut self) -> bool {
        self.display.render_frame(&self.ram)
    }

    /// One driver tick: a CPU slice of `cycles_per_tick` steps, a present (for
    /// [`VideoSource::Surface`]) and a display sample.
    pub fn tick(&mut self) -> Result<TickReport> {
        let exit = self.run_slice(self.config.cycles_per_tick);
        if self.config.video_source == VideoSource::Surface {
            self.present()?;
        }
        let frame_changed = self.render_frame();
        self.ticks += 1;
        Ok(TickReport {
            exit,
            frame_changed,
        })
    }

    pub fn framebuffer(&self) -> &[u32] {
        self.display.framebuffer()
    }

    pub fn display_resolution(&self) -> (u32, u32) {
        self.display.resolution()
    }

    /// The sampled display as tightly packed RGBA8 bytes.
    pub fn framebuffer_rgba(&self) -> Vec<u8> {
        self.display.framebuffer_rgba()
    }

    /// Snapshot of registers and program info for [`draw_status`].
    pub fn status_info<'a>(&self, program: &'a str) -> StatusInfo<'a> {
        StatusInfo {
            pc: self.cpu.pc(),
            acc: self.cpu.acc(),
            halted: self.cpu.is_halted(),
            ram_size: self.ram.size(),
            rom_len: self.rom.len(),
            program,
            ticks: self.ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpc_cpu::ProgramBuilder;

    fn small_config() -> MachineConfig {
        MachineConfig {
            ram_size: 0x1000,
            load_address: 0x0100,
            vram_start: 0x0800,
            width: 16,
            height: 8,
            cycles_per_tick: 10,
            video_source: VideoSource::Guest,
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MachineConfig {
            ram_size: 0,
            ..small_config()
        };
        assert!(matches!(
            Machine::new(config),
            Err(MachineError::Config(ConfigError::ZeroRamSize))
        ));
    }

    #[test]
    fn load_program_copies_and_reboots() {
        let mut m = Machine::new(small_config()).unwrap();
        let prog = ProgramBuilder::with_base(0x0100).lda_imm(9).halt().build();
        m.load_program(&prog).unwrap();

        assert_eq!(m.cpu().pc(), 0x0100);
        assert_eq!(m.rom_len(), 3);
        assert_eq!(m.ram().read_block(0x0100, 3).unwrap(), prog.as_slice());

        assert_eq!(m.run_slice(100), RunExit::Halted { executed: 2 });
        assert_eq!(m.cpu().acc(), 9);
    }

    #[test]
    fn oversized_program_leaves_machine_untouched() {
        let mut m = Machine::new(small_config()).unwrap();
        let prog = ProgramBuilder::new().lda_imm(1).add(1).build();
        m.load_program(&prog).unwrap();
        m.run_slice(1);
        let (ram_before, cpu_before) = (m.ram().clone(), m.cpu().clone());

        let huge = vec![0u8; 0x1000];
        let err = m.load_program(&huge).unwrap_err();
        assert!(matches!(
            err,
            MachineError::ProgramTooLarge {
                len: 0x1000,
                load_address: 0x0100,
                source: MemoryError::BlockOverflow { .. }
            }
        ));
        assert_eq!(m.ram(), &ram_before);
        assert_eq!(m.cpu(), &cpu_before);
        assert_eq!(m.rom_image(), prog.as_slice());
    }

    #[test]
    fn fault_halts_cpu_until_reload() {
        let mut m = Machine::new(small_config()).unwrap();
        m.load_program(&[0x00, 0x42]).unwrap();

        let exit = m.run_slice(10);
        assert_eq!(
            exit,
            RunExit::Fault {
                executed: 1,
                error: CpuError::IllegalOpcode {
                    opcode: 0x42,
                    pc: 0x0101
                }
            }
        );
        assert!(m.cpu().is_halted());
        assert!(m.last_fault().is_some());
        assert_eq!(m.run_slice(10), RunExit::Halted { executed: 0 });

        m.load_program(&[0xFF]).unwrap();
        assert!(m.last_fault().is_none());
        assert_eq!(m.run_slice(10), RunExit::Halted { executed: 1 });
    }

    #[test]
    fn hot_swap_mid_execution_keeps_rest_of_ram() {
        let mut m = Machine::new(small_config()).unwrap();
        // Busy loop that keeps storing an incrementing counter into 0x0900.
        let mut b = ProgramBuilder::with_base(0x0100);
        let top = b.here();
        b.add(1).sta(0x0900).jmp(top);
        m.load_program(&b.build()).unwrap();
        m.run_slice(30);
        assert_eq!(m.ram().read_u8(0x0900).unwrap(), 10);

        m.load_program(&ProgramBuilder::new().lda(0x0900).halt().build())
            .unwrap();
        assert_eq!(m.cpu().acc(), 0);
        m.run_slice(10);
        assert_eq!(m.cpu().acc(), 10);
        // The old JMP past the end of the new image is still there.
        assert_eq!(m.ram().read_u8(0x0105).unwrap(), 0x05);
    }

    #[test]
    fn guest_mode_tick_does_not_present() {
        let mut m = Machine::new(small_config()).unwrap();
        m.surface_mut().clear(200);
        m.load_program(&ProgramBuilder::with_base(0x100).lda_imm(5).sta(0x0803).halt().build())
            .unwrap();

        let report = m.tick().unwrap();
        assert_eq!(report.exit, RunExit::Halted { executed: 3 });
        assert!(report.frame_changed);
        assert_eq!(m.ram().read_u8(0x0800).unwrap(), 0);
        assert_eq!(
            m.framebuffer()[3],
            vpc_video::DEFAULT_PALETTE.color(5).to_u32()
        );

        let report = m.tick().unwrap();
        assert!(!report.frame_changed);
        assert_eq!(m.ticks(), 2);
    }

    #[test]
    fn surface_mode_tick_presents_every_tick() {
        let config = MachineConfig {
            video_source: VideoSource::Surface,
            ..small_config()
        };
        let mut m = Machine::new(config).unwrap();
        m.load_program(&ProgramBuilder::with_base(0x100).lda_imm(9).sta(0x0800).jmp(0x100).build())
            .unwrap();
        m.surface_mut().clear(7);

        assert!(m.tick().unwrap().frame_changed);
        // The presented back buffer replaces the guest's VRAM write.
        assert_eq!(m.ram().read_u8(0x0800).unwrap(), 7);
        assert!(!m.tick().unwrap().frame_changed);
    }

    #[test]
    fn sample_with_vram_above_64k_is_rejected() {
        let config = MachineConfig {
            ram_size: 0x2_0000,
            vram_start: 0x1_0000,
            ..MachineConfig::default()
        };
        let mut m = Machine::new(config).unwrap();
        assert_eq!(
            m.load_sample("pulse"),
            Err(MachineError::VramNotGuestAddressable(0x1_0000))
        );
        assert!(matches!(
            m.load_sample("nope"),
            Err(MachineError::UnknownProgram(_))
        ));
    }

    #[test]
    fn sample_must_fit_vram_window() {
        // 16x8 window holds 128 bytes.
        let mut m = Machine::new(small_config()).unwrap();
        m.load_program(&[0xFF]).unwrap();
        let ram_before = m.ram().clone();

        assert_eq!(
            m.load_sample("vram-fill"),
            Err(MachineError::SampleDoesNotFit {
                name: "vram-fill",
                needs: 256,
                vram_len: 128
            })
        );
        assert_eq!(m.ram(), &ram_before);
        assert_eq!(m.rom_image(), &[0xFF]);

        m.load_sample("pulse").unwrap();
        m.run_slice(4 * 2);
        assert_eq!(m.ram().read_u8(0x0800).unwrap(), 0x22);
    }

    #[test]
    fn sample_drawing_may_not_wrap_past_64k() {
        let config = MachineConfig {
            ram_size: 0x2_0000,
            vram_start: 0xFF80,
            width: 16,
            height: 16,
            ..MachineConfig::default()
        };
        let mut m = Machine::new(config).unwrap();
        assert_eq!(
            m.load_sample("vram-fill"),
            Err(MachineError::VramNotGuestAddressable(0xFF80))
        );
        assert_eq!(m.rom_len(), 0);

        m.load_sample("pulse").unwrap();
        m.run_slice(4);
        assert_eq!(m.ram().read_u8(0xFF80).unwrap(), 0x11);
    }
}
