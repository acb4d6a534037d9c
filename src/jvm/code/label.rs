use std::fmt;

/// Opaque position handle inside a method body
///
/// Labels only carry identity: two labels are the same position if and only if they compare
/// equal. Where a label sits in the code is decided by the [`CodeElement::Label`] marker that
/// places it.
///
/// [`CodeElement::Label`]: super::CodeElement::Label
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SynLabel(usize);

impl SynLabel {
    /// Get the next fresh label
    fn next(&self) -> SynLabel {
        SynLabel(self.0 + 1)
    }
}

/// Mints labels which are distinct from every label minted before by the same generator
///
/// Cloning does not split the generator source - the cloned generator will produce the same
/// sequence of labels as the original. Rewrites rely on this: the rewritten code carries on from
/// a clone of the original's generator, so fresh labels never collide with existing ones.
#[derive(Clone, Debug)]
pub struct SynLabelGenerator(SynLabel);

impl SynLabelGenerator {
    pub fn new() -> SynLabelGenerator {
        SynLabelGenerator(SynLabel(0))
    }

    /// Generate a fresh label
    pub fn fresh_label(&mut self) -> SynLabel {
        let to_return = self.0;
        self.0 = self.0.next();
        to_return
    }

    /// Make sure the generator will never hand out `label` (or anything before it)
    pub fn skip_past(&mut self, label: SynLabel) {
        if self.0 <= label {
            self.0 = label.next();
        }
    }
}

impl Default for SynLabelGenerator {
    fn default() -> Self {
        SynLabelGenerator::new()
    }
}

impl fmt::Debug for SynLabel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_fmt(format_args!("l{}", self.0))
    }
}
