//! Rendering a pipeline to workflow YAML and writing it to disk

pub mod document;
pub mod render;
pub mod serializer;
pub mod writer;

pub use document::{JobDocument, StepDocument, WorkflowDocument};
pub use render::render_step;
pub use serializer::{serialize, GENERATED_HEADER};
pub use writer::write_to_file;
