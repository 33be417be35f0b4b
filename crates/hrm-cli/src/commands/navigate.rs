//! 라우트 이동 명령.

use anyhow::Result;

use hrm_session::normalize_path;

use crate::Runtime;

pub fn run(rt: &Runtime, path: &str) -> Result<()> {
    let outcome = rt.ctx.navigate(path)?;

    if normalize_path(&outcome.location) == normalize_path(path) {
        println!("{}", outcome.location);
    } else {
        println!("{} → {} (리다이렉트 {}회)", path, outcome.location, outcome.redirects);
    }
    Ok(())
}
