pub mod notification;
pub mod store;
pub mod util;
