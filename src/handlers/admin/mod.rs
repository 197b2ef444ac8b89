pub mod users;

pub use users::{list_users, method_not_allowed};
