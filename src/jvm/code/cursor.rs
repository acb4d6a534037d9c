use crate::jvm::code::{CodeElement, MethodCode, SynLabel, SynLabelGenerator};
use std::iter::Rev;
use std::slice::Iter;

/// Sequential view over the elements of a method body, building up a rewritten copy as it goes
///
/// The cursor visits the original elements one at a time. The element under the cursor is only
/// copied to the output when the cursor moves past it, so there is a window in which new elements
/// can be inserted either before or after it.
///
/// The original code is never modified: dropping the cursor part way through throws away the
/// partial output and leaves the input as it was.
pub struct CodeCursor<'c> {
    /// Code being rewritten
    code: &'c MethodCode,

    /// Index of the element under the cursor
    current: Option<usize>,

    /// Index of the next element to visit
    next: usize,

    /// Rewritten elements so far (everything before `current`, plus insertions before it)
    output: Vec<CodeElement>,

    /// Elements to emit right after `current`
    pending_after: Vec<CodeElement>,

    /// Generator for fresh labels, guaranteed to not clash with labels in `code`
    label_generator: SynLabelGenerator,
}

impl<'c> CodeCursor<'c> {
    /// Start a cursor before the first element of the code
    pub fn new(code: &'c MethodCode) -> CodeCursor<'c> {
        let mut label_generator = code.label_generator.clone();
        for label in code.labels() {
            label_generator.skip_past(label);
        }

        CodeCursor {
            code,
            current: None,
            next: 0,
            output: Vec::with_capacity(code.elements.len()),
            pending_after: vec![],
            label_generator,
        }
    }

    /// Move to the next element, emitting the current one (and anything inserted after it)
    pub fn advance(&mut self) -> Option<&'c CodeElement> {
        self.flush_current();
        let code: &'c MethodCode = self.code;
        let element = code.elements.get(self.next)?;
        self.current = Some(self.next);
        self.next += 1;
        Some(element)
    }

    /// Element under the cursor
    pub fn current(&self) -> Option<&'c CodeElement> {
        let code: &'c MethodCode = self.code;
        self.current.map(|idx| &code.elements[idx])
    }

    /// Original elements before the cursor, starting with the closest one
    ///
    /// This never includes inserted elements.
    pub fn preceding(&self) -> Rev<Iter<'c, CodeElement>> {
        let code: &'c MethodCode = self.code;
        let end = self.current.unwrap_or(self.next);
        code.elements[..end].iter().rev()
    }

    /// Insert elements right before the element under the cursor
    pub fn insert_before(&mut self, elements: impl IntoIterator<Item = CodeElement>) {
        self.output.extend(elements);
    }

    /// Insert elements right after the element under the cursor
    ///
    /// Successive insertions after the same element end up in the order they were made.
    pub fn insert_after(&mut self, elements: impl IntoIterator<Item = CodeElement>) {
        self.pending_after.extend(elements);
    }

    /// Generate a fresh label for a new position in the code
    pub fn fresh_label(&mut self) -> SynLabel {
        self.label_generator.fresh_label()
    }

    /// Emit everything left and produce the rewritten code
    pub fn finish(mut self) -> MethodCode {
        self.flush_current();
        let code: &'c MethodCode = self.code;
        self.output.extend(code.elements[self.next..].iter().cloned());

        MethodCode {
            elements: self.output,
            exception_handlers: code.exception_handlers.clone(),
            label_generator: self.label_generator,
        }
    }

    fn flush_current(&mut self) {
        if let Some(idx) = self.current.take() {
            self.output.push(self.code.elements[idx].clone());
            self.output.append(&mut self.pending_after);
        }
    }
}
