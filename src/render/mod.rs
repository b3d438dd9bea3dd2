pub mod ascii;
pub mod canvas;
pub mod halfblock;
pub mod painter;
pub mod raster;

pub use canvas::{Canvas, ColorMode, RenderMode};
pub use painter::ScenePainter;
