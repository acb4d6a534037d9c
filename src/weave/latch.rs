use crate::jvm::code::Instruction;

/// Tracks whether the receiver of a constructor has been initialized yet
///
/// Until the constructor calls `super(...)` or `this(...)`, the receiver is uninitialized and
/// can't be passed anywhere. Objects allocated with `new` inside the constructor also get
/// initialized with an `invokespecial <init>`, so those are matched off against pending
/// allocations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstructorLatch {
    /// Receiver not initialized yet
    Suppressed {
        /// `new` instructions not yet matched by their `<init>` call
        pending_news: usize,
    },

    /// Receiver initialized (this state is final)
    Active,
}

impl ConstructorLatch {
    pub fn new() -> ConstructorLatch {
        ConstructorLatch::Suppressed { pending_news: 0 }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ConstructorLatch::Active)
    }

    /// Update the latch for an instruction, returning whether it just opened
    pub fn observe(&mut self, insn: &Instruction) -> bool {
        match self {
            ConstructorLatch::Active => false,
            ConstructorLatch::Suppressed { pending_news } => {
                if let Instruction::New(_) = insn {
                    *pending_news += 1;
                    false
                } else if insn.is_initializer_call() {
                    if *pending_news == 0 {
                        *self = ConstructorLatch::Active;
                        true
                    } else {
                        *pending_news -= 1;
                        false
                    }
                } else {
                    false
                }
            }
        }
    }
}

impl Default for ConstructorLatch {
    fn default() -> Self {
        ConstructorLatch::new()
    }
}
