//! HTML Adapter
//!
//! scraper（html5ever）による DocumentLoader の実装

pub mod html_document_loader;

pub use html_document_loader::HtmlDocumentLoader;
