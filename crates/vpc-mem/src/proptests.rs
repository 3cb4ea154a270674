use crate::{MemoryError, Ram};
use proptest::prelude::*;

const MAX_RAM_SIZE: usize = 4 * 1024;

fn ram_and_addr() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=MAX_RAM_SIZE).prop_flat_map(|size| (Just(size), 0..size))
}

proptest! {
    #[test]
    fn byte_write_then_read_returns_value((size, addr) in ram_and_addr(), value in any::<u8>()) {
        let mut ram = Ram::new(size).unwrap();
        ram.write_u8(addr, value).unwrap();
        prop_assert_eq!(ram.read_u8(addr).unwrap(), value);
    }

    #[test]
    fn block_write_is_reproduced_byte_by_byte(
        size in 1usize..=MAX_RAM_SIZE,
        start_frac in 0.0f64..1.0,
        data in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut ram = Ram::new(size).unwrap();
        let start = ((size as f64) * start_frac) as usize;
        let before = ram.clone();

        match ram.write_block(start, &data) {
            Ok(()) => {
                prop_assert!(start + data.len() <= size);
                for (i, &b) in data.iter().enumerate() {
                    prop_assert_eq!(ram.read_u8(start + i).unwrap(), b);
                }
            }
            Err(err) => {
                prop_assert!(start + data.len() > size);
                prop_assert_eq!(err, MemoryError::BlockOverflow { start, len: data.len(), size });
                prop_assert_eq!(ram, before);
            }
        }
    }
}
