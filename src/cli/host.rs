//! `todomaster host` runs one host request and prints the raw response.

use chrono::Utc;

use crate::cli::Context;
use crate::error::{Error, Result};
use crate::host::{self, HostRequest};

pub fn run(request: HostRequest, ctx: Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let response = host::handle(&mut store, request, Utc::now());

    if !response.success {
        let message = response
            .error
            .unwrap_or_else(|| "host request failed".to_string());
        return Err(Error::storage("host", message));
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
