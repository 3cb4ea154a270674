use vpc_video::palette::{ACCENT, BACKGROUND, PANEL, TEXT, WINDOW, WINDOW_BORDER};
use vpc_video::{text_width, FrameSurface};

/// Ticks per displayed uptime second.
const TICKS_PER_SECOND: u64 = 60;

/// What the status screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo<'a> {
    pub pc: u16,
    pub acc: u8,
    pub halted: bool,
    pub ram_size: usize,
    pub rom_len: usize,
    pub program: &'a str,
    pub ticks: u64,
}

/// Paints the machine status screen: a title bar with uptime and a register panel.
pub fn draw_status(surface: &mut FrameSurface, info: &StatusInfo<'_>) {
    let width = surface.width() as i32;
    let height = surface.height() as i32;

    surface.clear(BACKGROUND);

    surface.fill_rect(0, 0, width, 10, PANEL);
    surface.draw_rect(0, 0, width, 10, WINDOW_BORDER);
    let uptime = format!("UP {}S", info.ticks / TICKS_PER_SECOND);
    let uptime_x = (width - text_width(&uptime) as i32 - 3).max(3);
    // Drop the title rather than overlap the uptime on narrow displays.
    if uptime_x - 9 > text_width("VOS CORE") as i32 {
        surface.draw_text(3, 2, "VOS CORE", TEXT);
    }
    surface.draw_text(uptime_x, 2, &uptime, TEXT);

    surface.fill_rect(8, 16, width - 16, height - 24, WINDOW);
    surface.draw_rect(8, 16, width - 16, height - 24, WINDOW_BORDER);
    surface.fill_rect(8, 16, width - 16, 10, ACCENT);
    surface.draw_text(11, 18, "PRIMARY OS", TEXT);

    let state = if info.halted { "HALT" } else { "RUN" };
    let lines = [
        format!("CPU PC {:04X}", info.pc),
        format!("CPU A  {:02X}", info.acc),
        format!("STATE  {state}"),
        format!("RAM    {} B", info.ram_size),
        format!("ROM    {} B", info.rom_len),
        format!("PROG   {}", info.program),
    ];
    for (row, line) in lines.iter().enumerate() {
        surface.draw_text(14, 32 + 8 * row as i32, line, TEXT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> StatusInfo<'static> {
        StatusInfo {
            pc: 0x1234,
            acc: 0xAB,
            halted: false,
            ram_size: 65536,
            rom_len: 7,
            program: "demo",
            ticks: 125,
        }
    }

    #[test]
    fn paints_chrome() {
        let mut surface = FrameSurface::new(256, 128);
        draw_status(&mut surface, &info());

        assert_eq!(surface.pixel(0, 0), Some(WINDOW_BORDER));
        assert_eq!(surface.pixel(100, 5), Some(PANEL));
        assert_eq!(surface.pixel(2, 14), Some(BACKGROUND));
        assert_eq!(surface.pixel(100, 20), Some(ACCENT));
        assert_eq!(surface.pixel(200, 100), Some(WINDOW));
        assert_eq!(surface.pixel(255, 127), Some(BACKGROUND));
        assert!(surface.as_slice().contains(&TEXT));
    }

    #[test]
    fn text_depends_on_registers() {
        let mut a = FrameSurface::new(256, 128);
        let mut b = FrameSurface::new(256, 128);
        draw_status(&mut a, &info());
        draw_status(&mut b, &StatusInfo { pc: 0x1235, ..info() });
        assert_ne!(a, b);

        let mut c = FrameSurface::new(256, 128);
        draw_status(&mut c, &info());
        assert_eq!(a, c);
    }

    #[test]
    fn tiny_surface_is_clipped() {
        let mut surface = FrameSurface::new(12, 6);
        draw_status(&mut surface, &info());
        assert_eq!(surface.pixel(0, 0), Some(WINDOW_BORDER));
    }
}
