pub mod figure;
pub mod page;

pub use figure::{Figure, FigureStyle};
pub use page::render_page;
