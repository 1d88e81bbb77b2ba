pub mod align;
pub mod build;
pub mod genseq;
