use crate::assembly::{Label, LabelKind};

/// Hands out control-flow labels. Numbers are shared by every kind and never reused within a
/// compilation, so each label is unique across the program.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    current: usize,
}

impl LabelGenerator {
    pub const fn new() -> Self {
        Self { current: 0 }
    }
    pub fn new_label(&mut self, kind: LabelKind) -> Label {
        self.current += 1;
        let label = Label::Local {
            kind,
            num: self.current,
        };
        tracing::trace!(target: "compiler::labels", "allocated {label}");
        label
    }
}
