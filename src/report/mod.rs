//! Report assembly and rendering.

pub mod assembler;
pub mod charts;
pub mod generator;
pub mod text;

pub use assembler::{assemble, ReportDocument, ReportInputs};
pub use charts::render_charts;
pub use generator::{generate_json_report, generate_markdown_report};
pub use text::generate_text_report;
