use crate::jvm::code::{BranchInstruction, Instruction, SynLabel, SynLabelGenerator};
use crate::jvm::BinaryName;

/// One element of a method body, in program order
///
/// Besides actual instructions, the stream contains markers. Markers don't execute anything:
/// they pin down positions (labels) or carry debug information (line numbers).
#[derive(Clone, Debug, PartialEq)]
pub enum CodeElement {
    /// Places a label at this position
    Label(SynLabel),

    /// Source line for the instructions which follow
    LineNumber(u16),

    /// Straight-line instruction
    Instruction(Instruction),

    /// Instruction which may transfer control elsewhere
    Branch(BranchInstruction<SynLabel>),
}

impl CodeElement {
    /// Is this a pure marker (ie. not an executable instruction)?
    pub fn is_marker(&self) -> bool {
        matches!(self, CodeElement::Label(_) | CodeElement::LineNumber(_))
    }

    /// Is this an `athrow`?
    pub fn is_throw(&self) -> bool {
        matches!(self, CodeElement::Branch(BranchInstruction::AThrow))
    }
}

impl From<Instruction> for CodeElement {
    fn from(insn: Instruction) -> CodeElement {
        CodeElement::Instruction(insn)
    }
}

impl From<BranchInstruction<SynLabel>> for CodeElement {
    fn from(insn: BranchInstruction<SynLabel>) -> CodeElement {
        CodeElement::Branch(insn)
    }
}

/// Entry in the exception table of a method
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Start of the protected range (inclusive)
    pub start: SynLabel,

    /// End of the protected range (exclusive)
    pub end: SynLabel,

    /// Where control goes when an exception is caught
    pub handler: SynLabel,

    /// Which exceptions get caught (`None` catches everything, as in `finally` and `synchronized`)
    pub catch_type: Option<BinaryName>,
}

/// Label-addressable body of a method
///
/// This is the unit of input and output of a rewrite: the surrounding class reader produces one
/// of these per method and the class writer consumes the rewritten one.
#[derive(Clone, Debug, Default)]
pub struct MethodCode {
    /// Elements of the body, in program order
    pub elements: Vec<CodeElement>,

    /// Exception table (order matters: earlier entries take precedence)
    pub exception_handlers: Vec<ExceptionHandler>,

    /// Generator for labels in this method
    pub label_generator: SynLabelGenerator,
}

impl MethodCode {
    /// Create an empty method body
    pub fn new() -> MethodCode {
        MethodCode::default()
    }

    /// Generate a fresh label
    pub fn fresh_label(&mut self) -> SynLabel {
        self.label_generator.fresh_label()
    }

    /// Append a straight-line instruction
    pub fn push_instruction(&mut self, insn: Instruction) {
        self.elements.push(CodeElement::Instruction(insn));
    }

    /// Append a branch instruction
    pub fn push_branch_instruction(&mut self, insn: BranchInstruction<SynLabel>) {
        self.elements.push(CodeElement::Branch(insn));
    }

    /// Place a label at the current end of the body
    pub fn place_label(&mut self, label: SynLabel) {
        self.elements.push(CodeElement::Label(label));
    }

    /// Mark the source line for the instructions appended next
    pub fn push_line_number(&mut self, line: u16) {
        self.elements.push(CodeElement::LineNumber(line));
    }

    /// Every label mentioned anywhere in the body (placed, jumped to, or in the exception table)
    pub fn labels(&self) -> impl Iterator<Item = SynLabel> + '_ {
        let from_elements = self.elements.iter().flat_map(|element| {
            let labels: Vec<SynLabel> = match element {
                CodeElement::Label(label) => vec![*label],
                CodeElement::Branch(branch) => branch_targets(branch),
                CodeElement::LineNumber(_) | CodeElement::Instruction(_) => vec![],
            };
            labels
        });
        let from_handlers = self
            .exception_handlers
            .iter()
            .flat_map(|handler| [handler.start, handler.end, handler.handler]);
        from_elements.chain(from_handlers)
    }
}

/// Two bodies are equal when they have the same elements and exception table (regardless of how
/// far along their label generators are)
impl PartialEq for MethodCode {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements && self.exception_handlers == other.exception_handlers
    }
}

fn branch_targets(branch: &BranchInstruction<SynLabel>) -> Vec<SynLabel> {
    match branch {
        BranchInstruction::If(_, lbl)
        | BranchInstruction::IfICmp(_, lbl)
        | BranchInstruction::IfACmp(_, lbl)
        | BranchInstruction::IfNull(_, lbl)
        | BranchInstruction::Goto(lbl)
        | BranchInstruction::Jsr(lbl) => vec![*lbl],
        BranchInstruction::TableSwitch {
            default, targets, ..
        } => {
            let mut ts = vec![*default];
            ts.extend(targets.iter().copied());
            ts
        }
        BranchInstruction::LookupSwitch { default, targets } => {
            let mut ts = vec![*default];
            ts.extend(targets.iter().map(|(_, target)| *target));
            ts
        }
        BranchInstruction::Ret(_)
        | BranchInstruction::IReturn
        | BranchInstruction::LReturn
        | BranchInstruction::FReturn
        | BranchInstruction::DReturn
        | BranchInstruction::AReturn
        | BranchInstruction::Return
        | BranchInstruction::AThrow => vec![],
    }
}
