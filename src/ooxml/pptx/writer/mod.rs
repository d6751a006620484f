/// Builders for XML of elements added to existing slides.
pub mod shape;

pub use shape::{NewPicture, NewTextBox, TextFormat};
