#![forbid(unsafe_code)]

// Native-only tool; keep a stub `main` so wasm32 workspace builds still compile.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{anyhow, bail, Context, Result};
    use clap::{ArgGroup, Parser, ValueEnum};
    use tracing::info;
    use vpc_machine::programs::{self, SAMPLES};
    use vpc_machine::{draw_status, Machine, MachineConfig, RunExit, VideoSource};

    const DUMP_BYTES_PER_LINE: usize = 16;
    /// Enough lines to cover a full 16-bit address space.
    const MAX_DUMP_LINES: u64 = 0x1_0000 / DUMP_BYTES_PER_LINE as u64;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum VideoArg {
        /// The guest program owns VRAM.
        Guest,
        /// The host back buffer is presented into VRAM every tick.
        Surface,
    }

    #[derive(Debug, Parser)]
    #[command(
        name = "vpc-machine",
        about = "Headless runner for the virtual PC (program debugging and frame capture)",
        group(ArgGroup::new("image").args(["rom", "program"]))
    )]
    pub struct Args {
        /// Raw program image to load at the load address.
        #[arg(long)]
        rom: Option<PathBuf>,

        /// Built-in sample program to run (see --list-programs).
        #[arg(long)]
        program: Option<String>,

        /// List the built-in sample programs and exit.
        #[arg(long)]
        list_programs: bool,

        /// Write the sample programs as `<name>.bin` into DIR (existing files are kept) and exit.
        #[arg(long, value_name = "DIR")]
        install_samples: Option<PathBuf>,

        /// Number of ticks to run. Stops early when the guest halts.
        #[arg(long, default_value_t = 60)]
        ticks: u64,

        /// CPU step budget per tick.
        #[arg(long, value_parser = parse_u64)]
        cycles_per_tick: Option<u64>,

        /// Guest RAM size in bytes (`0x` prefix for hex).
        #[arg(long, value_parser = parse_usize)]
        ram: Option<usize>,

        #[arg(long, value_parser = parse_usize)]
        load_address: Option<usize>,

        #[arg(long, value_parser = parse_usize)]
        vram_start: Option<usize>,

        #[arg(long, value_parser = parse_usize)]
        width: Option<usize>,

        #[arg(long, value_parser = parse_usize)]
        height: Option<usize>,

        /// Where VRAM contents come from. Defaults to `surface` with --status-screen, `guest`
        /// otherwise.
        #[arg(long, value_enum)]
        video: Option<VideoArg>,

        /// Paint the machine status screen into the back buffer every tick.
        #[arg(long)]
        status_screen: bool,

        /// Write the last sampled frame to a PNG file on exit.
        #[arg(long, value_name = "PATH")]
        frame_png: Option<PathBuf>,

        /// Hex dump guest RAM starting at ADDR on exit.
        #[arg(long, value_name = "ADDR", value_parser = parse_usize)]
        dump_ram: Option<usize>,

        /// Number of 16-byte lines for --dump-ram (at most 4096).
        #[arg(
            long,
            default_value_t = 8,
            requires = "dump_ram",
            value_parser = clap::value_parser!(u64).range(1..=MAX_DUMP_LINES)
        )]
        dump_lines: u64,

        /// Print the first N instructions of the loaded image.
        #[arg(long, value_name = "N")]
        disasm: Option<usize>,
    }

    fn parse_usize(s: &str) -> std::result::Result<usize, String> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => usize::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
    }

    fn parse_u64(s: &str) -> std::result::Result<u64, String> {
        parse_usize(s).map(|v| v as u64)
    }

    pub fn main() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();

        let args = Args::parse();

        if args.list_programs {
            for sample in SAMPLES {
                println!("{:<14}{}", sample.name, sample.description);
            }
            return Ok(());
        }

        if let Some(dir) = &args.install_samples {
            let written = programs::install_samples(dir)
                .with_context(|| format!("failed to install samples into {}", dir.display()))?;
            for path in &written {
                println!("wrote {}", path.display());
            }
            println!("{} of {} samples installed", written.len(), SAMPLES.len());
            return Ok(());
        }

        let config = build_config(&args);
        let mut machine = Machine::new(config).context("failed to create machine")?;

        let name = if let Some(path) = &args.rom {
            let image = read_rom(path)?;
            machine
                .load_program(&image)
                .with_context(|| format!("failed to load ROM {}", path.display()))?;
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        } else {
            let name = args.program.as_deref().unwrap_or("demo");
            machine
                .load_sample(name)
                .with_context(|| format!("failed to load sample program {name:?}"))?;
            name.to_string()
        };
        info!(program = %name, rom_len = machine.rom_len(), "machine started");

        if let Some(count) = args.disasm {
            let base = machine.config().load_address as u16;
            for line in vpc_cpu::disassemble(machine.rom_image(), base, 0, count) {
                println!("{line}");
            }
        }

        let mut executed = 0u64;
        let mut fault = None;
        for _ in 0..args.ticks {
            if args.status_screen {
                let status = machine.status_info(&name);
                draw_status(machine.surface_mut(), &status);
            }
            let report = machine.tick().context("tick failed")?;
            executed = executed.saturating_add(report.exit.executed());
            match report.exit {
                RunExit::Completed { .. } => {}
                RunExit::Halted { .. } => {
                    if !args.status_screen {
                        break;
                    }
                }
                RunExit::Fault { error, .. } => {
                    fault = Some(error);
                    break;
                }
            }
        }

        let cpu = machine.cpu();
        println!(
            "ticks={} executed={executed} pc=0x{:04X} a=0x{:02X} halted={}",
            machine.ticks(),
            cpu.pc(),
            cpu.acc(),
            cpu.is_halted()
        );
        info!(ticks = machine.ticks(), executed, "machine stopped");

        if let Some(addr) = args.dump_ram {
            let count = args.dump_lines as usize;
            for line in vpc_mem::dump_lines(machine.ram(), addr, count, DUMP_BYTES_PER_LINE) {
                println!("{line}");
            }
        }

        if let Some(path) = &args.frame_png {
            write_frame_png(&machine, path)?;
        }

        if let Some(error) = fault {
            bail!("guest fault: {error}");
        }
        Ok(())
    }

    fn build_config(args: &Args) -> MachineConfig {
        let defaults = MachineConfig::default();
        let video_source = match args.video {
            Some(VideoArg::Guest) => VideoSource::Guest,
            Some(VideoArg::Surface) => VideoSource::Surface,
            None if args.status_screen => VideoSource::Surface,
            None => VideoSource::Guest,
        };
        MachineConfig {
            ram_size: args.ram.unwrap_or(defaults.ram_size),
            load_address: args.load_address.unwrap_or(defaults.load_address),
            vram_start: args.vram_start.unwrap_or(defaults.vram_start),
            width: args.width.unwrap_or(defaults.width),
            height: args.height.unwrap_or(defaults.height),
            cycles_per_tick: args.cycles_per_tick.unwrap_or(defaults.cycles_per_tick),
            video_source,
        }
    }

    fn read_rom(path: &Path) -> Result<Vec<u8>> {
        let image = std::fs::read(path)
            .with_context(|| format!("failed to read ROM: {}", path.display()))?;
        if image.is_empty() {
            bail!("ROM image is empty: {}", path.display());
        }
        Ok(image)
    }

    fn write_frame_png(machine: &Machine, path: &Path) -> Result<()> {
        let (w, h) = machine.display_resolution();
        let rgba = machine.framebuffer_rgba();
        let img =
            image::RgbaImage::from_raw(w, h, rgba).ok_or_else(|| anyhow!("invalid image data"))?;
        img.save(path)
            .with_context(|| format!("failed to write PNG: {}", path.display()))?;
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}
