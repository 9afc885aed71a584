pub mod fee;
pub mod gas;
pub mod history;
pub mod notification;

pub use fee::*;
pub use gas::*;
pub use history::*;
pub use notification::*;
