mod candidate;
pub use candidate::*;
mod evaluate;
pub use evaluate::*;
mod score;
pub use score::*;
