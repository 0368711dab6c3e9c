use anyhow::{Result, bail};
use strata_kernel::Resolved;

pub fn explain(resolved: &Resolved, key: Option<&str>) -> Result<()> {
    match key {
        Some(key) => {
            let Some(provenance) = resolved.origin(key) else {
                bail!("unknown setting '{key}'");
            };
            println!("{provenance}");
        },
        None => {
            for layer in resolved.layers() {
                println!("# {} {} ({} keys)", layer.kind, layer.origin, layer.values.len());
            }
            for provenance in resolved.provenance() {
                println!("{provenance}");
            }
        },
    }
    Ok(())
}
