pub mod contracts;
pub mod producer;
pub mod scheduler;

pub use contracts::*;
pub use producer::*;
pub use scheduler::*;
