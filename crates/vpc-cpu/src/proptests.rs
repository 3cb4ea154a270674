use crate::{Cpu, ProgramBuilder, RunExit};
use proptest::prelude::*;
use vpc_mem::Ram;

fn boot(program: &[u8]) -> (Cpu, Ram) {
    let mut ram = Ram::new(0x1_0000).unwrap();
    ram.write_block(0, program).unwrap();
    (Cpu::new(0), ram)
}

proptest! {
    #[test]
    fn add_and_sub_wrap(a in any::<u8>(), b in any::<u8>()) {
        let prog = ProgramBuilder::new().lda_imm(a).add(b).sta(0x1000).sub(b).halt().build();
        let (mut cpu, mut ram) = boot(&prog);

        prop_assert_eq!(cpu.run(&mut ram, 10), RunExit::Halted { executed: 5 });
        prop_assert_eq!(ram.read_u8(0x1000).unwrap(), a.wrapping_add(b));
        prop_assert_eq!(cpu.acc(), a);
    }

    #[test]
    fn reboot_resets_registers_from_any_state(
        program in proptest::collection::vec(any::<u8>(), 1..64),
        steps in 0u64..64,
        boot_address in any::<usize>(),
    ) {
        let (mut cpu, mut ram) = boot(&program);
        let _ = cpu.run(&mut ram, steps);
        let ram_before = ram.clone();

        cpu.reboot(boot_address);
        prop_assert_eq!(usize::from(cpu.pc()), boot_address % 0x1_0000);
        prop_assert_eq!(cpu.acc(), 0);
        prop_assert!(!cpu.is_halted());
        prop_assert_eq!(ram, ram_before);
    }

    #[test]
    fn execution_is_deterministic(
        program in proptest::collection::vec(any::<u8>(), 1..64),
        steps in 0u64..256,
    ) {
        let (mut cpu_a, mut ram_a) = boot(&program);
        let (mut cpu_b, mut ram_b) = boot(&program);

        let exit_a = cpu_a.run(&mut ram_a, steps);
        let exit_b = cpu_b.run(&mut ram_b, steps);
        prop_assert_eq!(exit_a, exit_b);
        prop_assert_eq!(cpu_a, cpu_b);
        prop_assert_eq!(ram_a, ram_b);
    }
}
