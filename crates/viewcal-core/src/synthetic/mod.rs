mod noise;
mod screen;

pub use noise::*;
pub use screen::*;
