//! Invoice documents for closings.
//!
//! [`layout`] turns a closing into positioned text runs page by page;
//! [`pdf`] writes those runs into an A4 PDF.

pub mod layout;
pub mod pdf;

pub use layout::{InvoiceLayout, TextRun};
pub use pdf::{InvoiceDocument, InvoiceRenderer};
