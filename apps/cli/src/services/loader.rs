//! Builds the settings loader from command-line source options.

use crate::models::args::SourceArgs;
use anyhow::{Context, Result};
use std::time::Duration;
use strata_kernel::{EnvSource, RemoteSource, Resolved, SecretsSource, SettingsLoader};
use tracing::debug;

pub fn loader(args: &SourceArgs) -> SettingsLoader {
    let mut loader = SettingsLoader::new();

    if let Some(url) = &args.remote_url {
        loader = loader.remote(
            RemoteSource::new(url.as_str())
                .timeout(Duration::from_secs(args.remote_timeout))
                .format(args.remote_format.into())
                .required(args.remote_required),
        );
    }

    let mut env = EnvSource::new();
    if let Some(prefix) = &args.env_prefix {
        env = env.prefix(prefix.as_str());
    }
    if args.no_env_file {
        env = env.without_env_file();
    } else if let Some(path) = &args.env_file {
        env = env.env_file(path);
    }
    loader = loader.env(env);

    for (key, value) in &args.assignments {
        loader = loader.init(key, value.clone());
    }

    if let Some(dir) = &args.secrets_dir {
        loader = loader.secrets(SecretsSource::new(dir));
    }

    if let Some(order) = &args.order {
        loader = loader.order(order.clone());
    }

    loader
}

/// Resolves the settings, validating them only when `validate` is set.
pub fn resolve(args: &SourceArgs, validate: bool) -> Result<Resolved> {
    let mut loader = loader(args);
    if !validate {
        loader = loader.skip_validation();
    }
    debug!(validate, "Resolving settings");
    loader.load().context("Failed to resolve settings")
}
