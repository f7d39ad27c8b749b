//! Rich error reporting using codespan-reporting.

use std::io::Write;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use paramscope_core::CatalogError;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// A source file database for codespan-reporting.
pub struct SourceDb {
    files: SimpleFiles<String, String>,
    file_id: usize,
}

impl SourceDb {
    /// Create a new source database with a single file.
    pub fn new(name: String, source: String) -> Self {
        let mut files = SimpleFiles::new();
        let file_id = files.add(name, source);
        Self { files, file_id }
    }

    pub fn parse_error(&self, message: &str, span: Range<usize>) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(message)
            .with_labels(vec![
                Label::primary(self.file_id, span).with_message("error occurs here")
            ])
            .with_notes(vec!["stage: parse".to_string()])
    }

    /// Render a diagnostic to any color-capable writer.
    pub fn emit(
        &self,
        writer: &mut dyn WriteColor,
        diagnostic: &Diagnostic<usize>,
    ) -> Result<(), codespan_reporting::files::Error> {
        term::emit(writer, &term::Config::default(), &self.files, diagnostic)
    }
}

/// Report a failed run on stderr. Parse errors are shown with source context.
pub fn report_error(err: &anyhow::Error) {
    let stream = StandardStream::stderr(ColorChoice::Auto);
    let mut writer = stream.lock();

    if let Some(CatalogError::Parse {
        path,
        source_code,
        source,
    }) = err.downcast_ref::<CatalogError>()
    {
        let db = SourceDb::new(path.display().to_string(), source_code.clone());
        let diagnostic = db.parse_error(&source.message, source.span.range.clone());
        if db.emit(&mut writer, &diagnostic).is_ok() {
            return;
        }
    }

    write_error_line(&mut writer, err).ok();
}

fn write_error_line(writer: &mut dyn WriteColor, err: &anyhow::Error) -> std::io::Result<()> {
    writer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(writer, "error")?;
    if let Some(catalog_err) = err.downcast_ref::<CatalogError>() {
        write!(writer, "[{}]", catalog_err.stage())?;
    }
    writer.reset()?;
    writeln!(writer, ": {}", error_chain(err))
}

/// The error and its causes joined by `: `, skipping causes a message already embeds.
fn error_chain(err: &anyhow::Error) -> String {
    let mut message = err.to_string();
    for cause in err.chain().skip(1) {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
    }
    message
}
