pub mod children;

pub use children::*;
