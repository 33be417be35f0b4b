//! 도메인 모델.
//!
//! 세션, 사용자 식별 정보, 역할 타입을 정의합니다.

pub mod role;
pub mod session;
pub mod user;

pub use role::{Role, RoleSet};
pub use session::Session;
pub use user::UserIdentity;
