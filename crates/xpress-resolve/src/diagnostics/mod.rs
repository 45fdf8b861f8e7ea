mod message;
mod printer;


use xpress_core::Location;

pub use message::{
    DiagnosticKind, DiagnosticMessage, RelatedInfo, Severity, WarningClass,
};
pub use printer::DiagnosticsPrinter;

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
    /// Bitset of kinds that are dropped on emit.
    disabled: u64,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(&mut self, class: WarningClass) {
        self.disabled |= class.kind().bit();
    }

    /// Whether diagnostics of `kind` reach the stream. Checks that only exist
    /// to produce such a diagnostic are skipped when this is false.
    pub fn is_enabled(&self, kind: DiagnosticKind) -> bool {
        self.disabled & kind.bit() == 0
    }

    /// Start a diagnostic of the given kind anchored at `loc`.
    ///
    /// Template arguments are added with `.arg()` in order.
    pub fn report(&mut self, kind: DiagnosticKind, loc: Location) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(kind, loc),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Drop everything reported after `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.message.args.push(arg.to_string());
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, loc: Location) -> Self {
        self.message.related.push(RelatedInfo::new(loc, msg));
        self
    }

    pub fn emit(self) {
        if self.diagnostics.is_enabled(self.message.kind) {
            self.diagnostics.messages.push(self.message);
        }
    }
}
