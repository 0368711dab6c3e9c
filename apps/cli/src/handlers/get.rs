use crate::services::render;
use anyhow::Result;
use strata_kernel::Resolved;

pub fn get(resolved: &Resolved, key: &str) -> Result<()> {
    println!("{}", render::field(resolved, key)?);
    Ok(())
}
