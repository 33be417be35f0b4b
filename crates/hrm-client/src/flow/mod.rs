//! 로그인/로그아웃 흐름.

pub mod login;
pub mod logout;

pub use login::{LoginError, LoginFlow, LoginState};
pub use logout::LogoutFlow;
