//! User accounts and cookie based authentication.

mod cookie;
mod delete_account;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use delete_account::delete_current_user;
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub(super) use token::Token;
pub use user::{
    User, UserID, UserProfile, Username, create_user, create_user_table, delete_user,
    get_user_by_id, get_user_by_username, update_password,
};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
#[cfg(test)]
pub use middleware::AuthState;
