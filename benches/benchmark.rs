use armlift::instruction::{ArmInstruction, ArmMode};
use armlift::operands::{Indexing, MemoryOperand, Operand, RegisterRange, ShiftType, ShiftedRegisterOperand};
use armlift::registers::RegisterIndex::{R0, R1, R2, R3};
use armlift::Translator;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A small mix of data-processing, memory and branch instructions, the
/// shapes a lifter sees most.
fn instruction_mix() -> Vec<ArmInstruction> {
    let mut instructions = vec![
        ArmInstruction::new(
            "adds",
            vec![Operand::reg(R0), Operand::reg(R1), Operand::reg(R2)],
        ),
        ArmInstruction::new(
            "movs",
            vec![
                Operand::reg(R0),
                Operand::Shifted(ShiftedRegisterOperand::by_reg(R1, ShiftType::Lsl, R2)),
            ],
        ),
        ArmInstruction::new(
            "ldr",
            vec![
                Operand::reg(R0),
                Operand::Mem(MemoryOperand::with_imm(R1, 4, Indexing::Pre)),
            ],
        ),
        ArmInstruction::new(
            "push",
            vec![Operand::reg_list(vec![RegisterRange::range(R0, R3)])],
        ),
        ArmInstruction::new("bl", vec![Operand::imm(0x8000)]),
    ];
    for (i, ins) in instructions.iter_mut().enumerate() {
        ins.address = 0x8000 + 4 * i as u32;
    }
    instructions
}

pub fn benchmark(c: &mut Criterion) {
    let instructions = instruction_mix();
    let mut translator = Translator::new(ArmMode::Arm);

    let mut g = c.benchmark_group("group");
    g.sample_size(100);

    g.bench_function("translate_mix", |b| {
        b.iter(|| {
            for ins in &instructions {
                black_box(translator.translate(ins).unwrap());
            }
        })
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
