//! Stack discipline shared by every construct: `$30` points at the last pushed word and grows
//! downwards one word at a time.
use super::AssemblyOutput;
use crate::assembly::*;
use crate::variables::WORD_SIZE;

pub fn push_register(out: &mut AssemblyOutput, register: Register) {
    out.push_instruction(Instruction::Sw {
        register,
        address: Memory::new(Register::STACK, -WORD_SIZE),
    });
    out.push_instruction(Instruction::Sub {
        target: Register::STACK,
        lhs: Register::STACK,
        rhs: Register::WORD_SIZE,
    });
}

pub fn pop_register(out: &mut AssemblyOutput, register: Register) {
    out.push_instruction(Instruction::Add {
        target: Register::STACK,
        lhs: Register::STACK,
        rhs: Register::WORD_SIZE,
    });
    out.push_instruction(Instruction::Lw {
        register,
        address: Memory::new(Register::STACK, -WORD_SIZE),
    });
}

/// Drops `count` words without reading them back.
pub fn discard_words(out: &mut AssemblyOutput, count: usize) {
    for _ in 0..count {
        out.push_instruction(Instruction::Add {
            target: Register::STACK,
            lhs: Register::STACK,
            rhs: Register::WORD_SIZE,
        });
    }
}

/// `lis` followed by the word to load.
pub fn load_constant(out: &mut AssemblyOutput, register: Register, word: Word) {
    out.push_instruction(Instruction::Lis(register));
    out.push_directive(Directive::Word(word));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop() {
        let mut out = AssemblyOutput::new();
        push_register(&mut out, Register::RESULT);
        pop_register(&mut out, Register::SCRATCH);
        assert_eq!(
            out.lines(),
            [
                "sw $3, -4($30)",
                "sub $30, $30, $4",
                "add $30, $30, $4",
                "lw $5, -4($30)"
            ]
        );
    }

    #[test]
    fn constants_take_two_lines() {
        let mut out = AssemblyOutput::new();
        load_constant(&mut out, Register::SCRATCH, Word::Runtime(Runtime::Print));
        discard_words(&mut out, 2);
        assert_eq!(
            out.lines(),
            [
                "lis $5",
                ".word print",
                "add $30, $30, $4",
                "add $30, $30, $4"
            ]
        );
    }
}
