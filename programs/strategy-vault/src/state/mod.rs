pub mod queue;
pub mod strategies;
pub mod vault;

pub use queue::*;
pub use strategies::*;
pub use vault::*;
