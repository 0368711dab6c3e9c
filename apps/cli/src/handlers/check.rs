use anyhow::Result;
use strata_kernel::Resolved;
use strata_kernel::domain::settings::mask_url_credentials;
use tracing::info;

/// Prints a short summary; reaching this point means resolution and validation passed.
pub fn check(resolved: &Resolved) -> Result<()> {
    let mongo = mask_url_credentials(&resolved.mongo().connection_uri());
    let features = resolved.features().names().join(",");

    info!(layers = resolved.layers().len(), "Settings check passed");
    println!("settings ok");
    println!("  features: {}", if features.is_empty() { "none" } else { features.as_str() });
    println!("  mongo:    {mongo}");
    println!("  redis:    {}:{}/{}", resolved.redis_host, resolved.redis_port, resolved.redis_db);
    println!("  log:      {}", resolved.effective_log_level());
    Ok(())
}
