//! Parse error reporting using codespan-reporting.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use std::ops::Range;
use termcolor::{ColorChoice, StandardStream};
use tyshape_syntax::ParseError;

/// A single-file source database for codespan-reporting.
pub struct SourceDb {
    files: SimpleFiles<String, String>,
    file_id: usize,
}

impl SourceDb {
    pub fn new(name: String, source: String) -> Self {
        let mut files = SimpleFiles::new();
        let file_id = files.add(name, source);
        Self { files, file_id }
    }

    /// Report a parse error with source context.
    pub fn report_parse_error(&self, message: &str, span: Range<usize>) {
        let diagnostic = Diagnostic::error()
            .with_message(message)
            .with_labels(vec![
                Label::primary(self.file_id, span).with_message("skipped from here")
            ])
            .with_notes(vec![
                "declarations after this point are still converted".to_string()
            ]);

        let writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        let _ = term::emit(&mut writer.lock(), &config, &self.files, &diagnostic);
    }
}

/// Report every parse error of `source` to stderr.
pub fn report_parse_errors(name: &str, source: &str, errors: &[ParseError]) {
    if errors.is_empty() {
        return;
    }
    let db = SourceDb::new(name.to_string(), source.to_string());
    for err in errors {
        db.report_parse_error(&err.message, err.span.range());
    }
}
