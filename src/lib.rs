pub mod neural;
pub mod prelude;
pub mod vector;
