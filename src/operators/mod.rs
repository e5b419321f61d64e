//! Built-in reference modules.

mod gradient;
mod shapes;

pub use gradient::{GradientFactory, GradientOperator, fill_gradient};
pub use shapes::{ShapesFactory, ShapesOperator, polygon};
