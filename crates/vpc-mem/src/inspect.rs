use crate::Ram;

/// Renders `line_count` lines of `bytes_per_line` bytes each, starting at `start`.
///
/// Line format is `AAAA: HH HH ..`. Addresses wrap modulo the RAM size, so a dump window may
/// run past the end of RAM without faulting. The output grows with `line_count`; callers taking
/// the count from user input should bound it.
pub fn dump_lines(ram: &Ram, start: usize, line_count: usize, bytes_per_line: usize) -> Vec<String> {
    let size = ram.size();
    let cells = ram.as_slice();
    let mut addr = start % size;

    let mut lines = Vec::new();
    for _ in 0..line_count {
        let mut line = format!("{:04X}:", addr & 0xFFFF);
        for i in 0..bytes_per_line {
            line.push_str(&format!(" {:02X}", cells[(addr + i) % size]));
        }
        lines.push(line);
        addr = (addr + bytes_per_line) % size;
    }
    lines
}
