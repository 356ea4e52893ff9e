/// Plain-text table rendering for the output area.
pub mod render;

pub use render::render;
