//! PDF rendering of invoice layouts.

use itinera_shared::config::InvoiceConfig;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::closing::ClosingDetail;
use crate::error::CommissionError;
use crate::invoice::layout::InvoiceLayout;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LAYER: &str = "Invoice";

/// A rendered invoice ready for download.
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    /// Suggested file name, `{invoice_number}.pdf`.
    pub file_name: String,
    /// PDF bytes.
    pub bytes: Vec<u8>,
}

impl InvoiceDocument {
    /// MIME type of the document.
    pub const CONTENT_TYPE: &'static str = "application/pdf";
}

/// Renders closings into A4 PDF invoices.
#[derive(Debug, Clone)]
pub struct InvoiceRenderer {
    config: InvoiceConfig,
}

impl InvoiceRenderer {
    /// Creates a renderer printing the given issuer details.
    #[must_use]
    pub const fn new(config: InvoiceConfig) -> Self {
        Self { config }
    }

    /// Renders `detail`. Reversed closings render too, marked as such.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Document` if the PDF cannot be written.
    pub fn render(&self, detail: &ClosingDetail) -> Result<InvoiceDocument, CommissionError> {
        let label = detail.closing.invoice_label();
        let layout = InvoiceLayout::build(detail, &self.config);

        let (doc, first_page, first_layer) = PdfDocument::new(
            label.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER,
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(document_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(document_error)?;

        for (index, runs) in layout.pages().iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER);
                doc.get_page(page).get_layer(layer)
            };
            for run in runs {
                let font = if run.bold { &bold } else { &regular };
                layer.use_text(
                    run.text.as_str(),
                    f32::from(run.size),
                    Mm(f32::from(run.x)),
                    Mm(f32::from(run.y)),
                    font,
                );
            }
        }

        let bytes = doc.save_to_bytes().map_err(document_error)?;

        Ok(InvoiceDocument {
            file_name: format!("{label}.pdf"),
            bytes,
        })
    }
}

fn document_error(err: printpdf::Error) -> CommissionError {
    CommissionError::Document(err.to_string())
}
