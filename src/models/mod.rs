pub mod catalog;
pub mod correction;
pub mod enums;
pub mod order;

pub use catalog::*;
pub use correction::*;
pub use enums::*;
pub use order::*;
