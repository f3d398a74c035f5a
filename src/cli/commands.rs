pub mod accounts;
pub mod households;
pub mod pay;
pub mod posture;
pub mod split;

pub use accounts::accounts;
pub use households::{households, switch};
pub use pay::pay;
pub use posture::posture;
pub use split::split;
