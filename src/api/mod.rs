pub mod harvest;
pub mod join;
pub mod migrate;
pub mod search;

pub use harvest::*;
pub use join::*;
pub use migrate::*;
pub use search::*;
