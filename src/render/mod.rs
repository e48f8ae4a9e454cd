//! Rendering of processed documents to output pages.

pub mod html;

pub use html::{relative_uri, render_document};
