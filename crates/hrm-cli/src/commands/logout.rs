//! 로그아웃 명령.

use anyhow::Result;

use crate::Runtime;

pub fn run(rt: &Runtime) -> Result<()> {
    if rt.ctx.logout_flow().logout() {
        println!("로그아웃되었습니다.");
    } else {
        println!("이미 로그아웃 상태입니다.");
    }
    println!("이동: {}", rt.location());
    Ok(())
}
