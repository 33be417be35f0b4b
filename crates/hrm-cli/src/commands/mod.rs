//! CLI 명령어 구현 모듈.

pub mod get;
pub mod login;
pub mod logout;
pub mod navigate;
pub mod whoami;
