use crate::isa::decode_at;

/// Produces a listing window of `line_count` instructions, skipping the first
/// `start_instruction` instructions of `image`.
///
/// Each line is `AAAA TEXT`, where `AAAA` is the guest address (`base` + offset, mod 64KiB).
pub fn disassemble(
    image: &[u8],
    base: u16,
    start_instruction: usize,
    line_count: usize,
) -> Vec<String> {
    if image.is_empty() {
        return vec!["NO ROM LOADED".to_string()];
    }

    // Each line consumes at least one byte of the image.
    let mut lines = Vec::with_capacity(line_count.min(image.len()));
    let mut offset = 0usize;
    let mut index = 0usize;
    while lines.len() < line_count {
        let Some(inst) = decode_at(image, offset) else {
            break;
        };
        if index >= start_instruction {
            let addr = base.wrapping_add(offset as u16);
            lines.push(format!("{addr:04X} {inst}"));
        }
        offset += inst.width();
        index += 1;
    }

    if lines.is_empty() {
        return vec!["END OF ROM".to_string()];
    }
    lines
}
