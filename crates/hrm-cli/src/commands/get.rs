//! 인증된 API 조회 명령.

use anyhow::{anyhow, Result};
use serde_json::Value;

use hrm_client::{ClientError, CORE_CLIENT, EMPLOYEE_CLIENT};

use crate::Runtime;

pub async fn run(rt: &Runtime, client: &str, path: &str, cached: bool) -> Result<()> {
    let api = rt.ctx.client(client).ok_or_else(|| {
        anyhow!(
            "Unknown client: {}. Supported: {}, {}",
            client,
            CORE_CLIENT,
            EMPLOYEE_CLIENT
        )
    })?;

    let result: Result<Value, ClientError> = if cached {
        api.get_cached(path).await
    } else {
        api.get(path).await
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) if e.is_unauthorized() => {
            println!("세션이 만료되었습니다. 다시 로그인해 주세요.");
            println!("이동: {}", rt.location());
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
