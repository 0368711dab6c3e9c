use crate::models::args::OutputFormat;
use crate::services::render;
use anyhow::Result;
use strata_kernel::Resolved;

pub fn show(resolved: &Resolved, reveal: bool, format: OutputFormat) -> Result<()> {
    let rendered = if reveal {
        render::document(resolved, format)?
    } else {
        render::document(&resolved.redacted(), format)?
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
