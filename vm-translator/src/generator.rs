//! Translates `VmCommand`s into Hack assembly.
//!
//! One `AssemblyGenerator` lives for the whole run. Its label-seed counter is
//! monotonic across every `.vm` file translated in that run, so minted labels
//! (`TRUE<seed>`, `END<seed>`, `RET<seed>`) never collide even across modules.

use crate::command::{Segment, VmCommand};
use crate::instruction::AsmInstruction;

const SCRATCH_POP_DEST: u16 = 13;
const SCRATCH_END_FRAME: u16 = 13;
const SCRATCH_RET_ADDR: u16 = 14;
const SCRATCH_RETURN_POP: u16 = 15;
const STACK_POINTER_INIT: u16 = 256;

enum Base {
    Indirect(&'static str),
    Direct(u16),
}

fn segment_base(segment: Segment) -> Base {
    match segment {
        Segment::Local => Base::Indirect("LCL"),
        Segment::Argument => Base::Indirect("ARG"),
        Segment::This => Base::Indirect("THIS"),
        Segment::That => Base::Indirect("THAT"),
        Segment::Temp => Base::Direct(5),
        Segment::Pointer => Base::Direct(3),
        Segment::Static | Segment::Constant => {
            unreachable!("static and constant segments are resolved without a base")
        }
    }
}

pub struct AssemblyGenerator {
    next_label_seed: u64,
    module_name: String,
}

impl AssemblyGenerator {
    pub fn new() -> Self {
        Self {
            next_label_seed: 0,
            module_name: String::new(),
        }
    }

    pub fn set_module(&mut self, module_name: impl Into<String>) {
        self.module_name = module_name.into();
    }

    fn next_label(&mut self, prefix: &str) -> String {
        let label = format!("{prefix}{}", self.next_label_seed);
        self.next_label_seed += 1;
        label
    }

    /// `SP := 256; call Sys.init 0` — emitted once, before any file's code,
    /// when the driver is translating a directory of VM files.
    pub fn bootstrap(&mut self) -> Vec<AsmInstruction> {
        let mut asm = vec![
            AsmInstruction::a(STACK_POINTER_INIT),
            AsmInstruction::c("D", "A"),
            AsmInstruction::a_symbol("SP"),
            AsmInstruction::c("M", "D"),
        ];
        asm.extend(self.translate(&VmCommand::Call("Sys.init".to_string(), 0)));
        asm
    }

    pub fn translate(&mut self, command: &VmCommand) -> Vec<AsmInstruction> {
        match command {
            VmCommand::Add => self.binary_op("M+D"),
            VmCommand::Sub => self.binary_op("M-D"),
            VmCommand::And => self.binary_op("M&D"),
            VmCommand::Or => self.binary_op("M|D"),
            VmCommand::Neg => self.unary_op("-D"),
            VmCommand::Not => self.unary_op("!D"),
            VmCommand::Eq => self.comparison("JEQ"),
            VmCommand::Gt => self.comparison("JGT"),
            VmCommand::Lt => self.comparison("JLT"),
            VmCommand::Push(segment, index) => self.push(*segment, *index),
            VmCommand::Pop(segment, index) => self.pop(*segment, *index),
            VmCommand::Label(name) => vec![AsmInstruction::label(name.clone())],
            VmCommand::Goto(name) => goto(name),
            VmCommand::IfGoto(name) => if_goto(name),
            VmCommand::Function(name, n_locals) => self.function(name, *n_locals),
            VmCommand::Call(name, n_args) => self.call(name, *n_args),
            VmCommand::Return => self.ret(),
        }
    }

    fn unary_op(&self, comp: &'static str) -> Vec<AsmInstruction> {
        let mut asm = pop_to_d();
        asm.push(AsmInstruction::c("D", comp));
        asm.extend(push_d());
        asm
    }

    fn binary_op(&self, comp: &'static str) -> Vec<AsmInstruction> {
        // pop y into D, decrement SP again so A=SP points at x, then M := M op D.
        let mut asm = pop_to_d();
        asm.extend(decrement_sp());
        asm.extend(load_sp_to_a());
        asm.push(AsmInstruction::c("M", comp));
        asm.extend(increment_sp());
        asm
    }

    fn comparison(&mut self, jump_mnemonic: &'static str) -> Vec<AsmInstruction> {
        let true_label = self.next_label("TRUE");
        let end_label = self.next_label("END");

        let mut asm = pop_to_d();
        asm.extend(decrement_sp());
        asm.extend(load_sp_to_a());
        asm.push(AsmInstruction::c("D", "M-D"));
        asm.push(AsmInstruction::a_symbol(&true_label));
        asm.push(AsmInstruction::jump("D", jump_mnemonic));

        // false case
        asm.extend(load_sp_to_a());
        asm.push(AsmInstruction::c("M", "0"));
        asm.extend(goto(&end_label));

        // true case
        asm.push(AsmInstruction::label(true_label));
        asm.extend(load_sp_to_a());
        asm.push(AsmInstruction::c("M", "-1"));

        asm.push(AsmInstruction::label(end_label));
        asm.extend(increment_sp());
        asm
    }

    /// Computes the effective address of `segment[index]` into the A register.
    fn load_effective_address(&self, segment: Segment, index: u16) -> Vec<AsmInstruction> {
        let mut asm = match segment_base(segment) {
            Base::Indirect(symbol) => vec![AsmInstruction::a_symbol(symbol), AsmInstruction::c("D", "M")],
            Base::Direct(address) => vec![AsmInstruction::a(address), AsmInstruction::c("D", "A")],
        };
        asm.push(AsmInstruction::a(index));
        asm.push(AsmInstruction::c("A", "D+A"));
        asm
    }

    fn push(&self, segment: Segment, index: u16) -> Vec<AsmInstruction> {
        let mut asm = match segment {
            Segment::Constant => vec![AsmInstruction::a(index), AsmInstruction::c("D", "A")],
            Segment::Static => vec![
                AsmInstruction::a_symbol(self.static_symbol(index)),
                AsmInstruction::c("D", "M"),
            ],
            _ => {
                let mut asm = self.load_effective_address(segment, index);
                asm.push(AsmInstruction::c("D", "M"));
                asm
            }
        };
        asm.extend(push_d());
        asm
    }

    fn pop(&self, segment: Segment, index: u16) -> Vec<AsmInstruction> {
        match segment {
            Segment::Static => {
                let mut asm = pop_to_d();
                asm.push(AsmInstruction::a_symbol(self.static_symbol(index)));
                asm.push(AsmInstruction::c("M", "D"));
                asm
            }
            _ => self.pop_to_effective_address(segment, index, SCRATCH_POP_DEST),
        }
    }

    fn pop_to_effective_address(
        &self,
        segment: Segment,
        index: u16,
        scratch: u16,
    ) -> Vec<AsmInstruction> {
        let mut asm = self.load_effective_address(segment, index);
        asm.push(AsmInstruction::c("D", "A"));
        asm.push(AsmInstruction::a(scratch));
        asm.push(AsmInstruction::c("M", "D"));
        asm.extend(pop_to_d());
        asm.push(AsmInstruction::a(scratch));
        asm.push(AsmInstruction::c("A", "M"));
        asm.push(AsmInstruction::c("M", "D"));
        asm
    }

    fn static_symbol(&self, index: u16) -> String {
        format!("{}.{index}", self.module_name)
    }

    fn function(&self, name: &str, n_locals: u16) -> Vec<AsmInstruction> {
        let mut asm = vec![AsmInstruction::label(name.to_string())];
        for _ in 0..n_locals {
            asm.push(AsmInstruction::a(0));
            asm.push(AsmInstruction::c("D", "A"));
            asm.extend(push_d());
        }
        asm
    }

    fn call(&mut self, name: &str, n_args: u16) -> Vec<AsmInstruction> {
        let return_label = self.next_label("RET");

        let mut asm = vec![AsmInstruction::a_symbol(&return_label), AsmInstruction::c("D", "A")];
        asm.extend(push_d());

        for symbol in ["LCL", "ARG", "THIS", "THAT"] {
            asm.push(AsmInstruction::a_symbol(symbol));
            asm.push(AsmInstruction::c("D", "M"));
            asm.extend(push_d());
        }

        // ARG := SP - 5 - nArgs
        asm.extend(load_sp_to_a());
        asm.push(AsmInstruction::c("D", "A"));
        asm.push(AsmInstruction::a(5));
        asm.push(AsmInstruction::c("D", "D-A"));
        asm.push(AsmInstruction::a(n_args));
        asm.push(AsmInstruction::c("D", "D-A"));
        asm.push(AsmInstruction::a_symbol("ARG"));
        asm.push(AsmInstruction::c("M", "D"));

        // LCL := SP
        asm.extend(load_sp_to_a());
        asm.push(AsmInstruction::c("D", "A"));
        asm.push(AsmInstruction::a_symbol("LCL"));
        asm.push(AsmInstruction::c("M", "D"));

        asm.extend(goto(name));
        asm.push(AsmInstruction::label(return_label));
        asm
    }

    #[allow(clippy::vec_init_then_push)]
    fn ret(&self) -> Vec<AsmInstruction> {
        let mut asm = Vec::new();

        // R13 := endFrame (= LCL)
        asm.push(AsmInstruction::a_symbol("LCL"));
        asm.push(AsmInstruction::c("D", "M"));
        asm.push(AsmInstruction::a(SCRATCH_END_FRAME));
        asm.push(AsmInstruction::c("M", "D"));

        // R14 := retAddr (= *(endFrame - 5))
        asm.push(AsmInstruction::a(5));
        asm.push(AsmInstruction::c("A", "D-A"));
        asm.push(AsmInstruction::c("D", "M"));
        asm.push(AsmInstruction::a(SCRATCH_RET_ADDR));
        asm.push(AsmInstruction::c("M", "D"));

        // *ARG := pop() — use R15 so R13 (endFrame) survives.
        asm.extend(self.pop_to_effective_address(Segment::Argument, 0, SCRATCH_RETURN_POP));

        // SP := ARG + 1
        asm.push(AsmInstruction::a_symbol("ARG"));
        asm.push(AsmInstruction::c("D", "M"));
        asm.push(AsmInstruction::a_symbol("SP"));
        asm.push(AsmInstruction::c("M", "D+1"));

        for (offset, target) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            asm.push(AsmInstruction::a(SCRATCH_END_FRAME));
            asm.push(AsmInstruction::c("D", "M"));
            asm.push(AsmInstruction::a(offset));
            asm.push(AsmInstruction::c("A", "D-A"));
            asm.push(AsmInstruction::c("D", "M"));
            asm.push(AsmInstruction::a_symbol(target));
            asm.push(AsmInstruction::c("M", "D"));
        }

        // goto retAddr
        asm.push(AsmInstruction::a(SCRATCH_RET_ADDR));
        asm.push(AsmInstruction::c("A", "M"));
        asm.push(AsmInstruction::jump("0", "JMP"));
        asm
    }
}

impl Default for AssemblyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn push_d() -> Vec<AsmInstruction> {
    let mut asm = load_sp_to_a();
    asm.push(AsmInstruction::c("M", "D"));
    asm.extend(increment_sp());
    asm
}

fn pop_to_d() -> Vec<AsmInstruction> {
    let mut asm = decrement_sp();
    asm.extend(load_sp_to_a());
    asm.push(AsmInstruction::c("D", "M"));
    asm
}

fn load_sp_to_a() -> Vec<AsmInstruction> {
    vec![AsmInstruction::a_symbol("SP"), AsmInstruction::c("A", "M")]
}

fn increment_sp() -> Vec<AsmInstruction> {
    vec![AsmInstruction::a_symbol("SP"), AsmInstruction::c("M", "M+1")]
}

fn decrement_sp() -> Vec<AsmInstruction> {
    vec![AsmInstruction::a_symbol("SP"), AsmInstruction::c("M", "M-1")]
}

fn goto(label: &str) -> Vec<AsmInstruction> {
    vec![AsmInstruction::a_symbol(label), AsmInstruction::jump("0", "JMP")]
}

fn if_goto(label: &str) -> Vec<AsmInstruction> {
    let mut asm = pop_to_d();
    asm.push(AsmInstruction::a_symbol(label));
    asm.push(AsmInstruction::jump("D", "JNE"));
    asm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(instructions: &[AsmInstruction]) -> Vec<String> {
        instructions.iter().map(AsmInstruction::render).collect()
    }

    #[test]
    fn push_constant_emits_literal_load_and_push() {
        let generator = AssemblyGenerator::new();
        let asm = generator.push(Segment::Constant, 17);
        assert_eq!(
            render(&asm),
            vec!["@17", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
        );
    }

    #[test]
    fn push_static_namespaces_by_module() {
        let mut generator = AssemblyGenerator::new();
        generator.set_module("Foo");
        let asm = generator.push(Segment::Static, 3);
        assert_eq!(render(&asm)[0], "@Foo.3");
    }

    #[test]
    fn label_uniqueness_across_comparisons() {
        let mut generator = AssemblyGenerator::new();
        let first = generator.translate(&VmCommand::Eq);
        let second = generator.translate(&VmCommand::Lt);
        let labels_of = |asm: &[AsmInstruction]| -> Vec<String> {
            asm.iter()
                .filter_map(|i| match i {
                    AsmInstruction::Label(name) => Some(name.clone()),
                    _ => None,
                })
                .collect()
        };
        let mut all = labels_of(&first);
        all.extend(labels_of(&second));
        let mut deduped = all.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(all.len(), deduped.len(), "minted labels must be pairwise distinct");
    }

    #[test]
    fn call_and_return_are_inverse_stack_shapes() {
        let mut generator = AssemblyGenerator::new();
        let call_asm = generator.call("Foo.bar", 2);
        // must end with a jump to the callee and a return-address label.
        assert!(render(&call_asm).contains(&"@Foo.bar".to_string()));
        let ret_asm = generator.ret();
        assert!(render(&ret_asm).iter().any(|l| l == "0;JMP"));
    }
}
