//! Builder-pattern printer for rendering diagnostics as plain text.

use std::fmt::Write;

use xpress_core::Interner;

use super::Diagnostics;
use super::message::Severity;

/// Renders one line per diagnostic, `file:line: severity: message`, with
/// related locations indented below it.
pub struct DiagnosticsPrinter<'d, 'i> {
    diagnostics: &'d Diagnostics,
    interner: &'i Interner,
    min_severity: Severity,
}

impl<'d, 'i> DiagnosticsPrinter<'d, 'i> {
    pub fn new(diagnostics: &'d Diagnostics, interner: &'i Interner) -> Self {
        Self {
            diagnostics,
            interner,
            min_severity: Severity::Warning,
        }
    }

    /// Only print errors.
    pub fn errors_only(mut self) -> Self {
        self.min_severity = Severity::Error;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let shown = self
            .diagnostics
            .iter()
            .filter(|d| self.min_severity == Severity::Warning || d.is_error());

        for (i, diag) in shown.enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(
                w,
                "{}: {}: {}",
                diag.location().render(self.interner),
                diag.severity(),
                diag.message()
            )?;
            for related in diag.related() {
                write!(
                    w,
                    "\n  {}: {}",
                    related.location().render(self.interner),
                    related.message()
                )?;
            }
        }

        Ok(())
    }
}

impl Diagnostics {
    pub fn printer<'d, 'i>(&'d self, interner: &'i Interner) -> DiagnosticsPrinter<'d, 'i> {
        DiagnosticsPrinter::new(self, interner)
    }

    pub fn render(&self, interner: &Interner) -> String {
        self.printer(interner).render()
    }
}
