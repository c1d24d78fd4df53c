use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

pub mod logging;

use langstore::backends::FileBackend;
use langstore::contexts::{template, CacheError};
use langstore::global::{self, SharedCache};

#[derive(Clone)]
pub struct Config {
    pub verbose: bool,
    pub store_path: PathBuf,
}

/// Parses a `--var NAME=VALUE` argument
pub fn parse_var(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))?;
    template::validate_name(name).map_err(|e| e.to_string())?;
    Ok((name.to_string(), value.to_string()))
}

/// Runs a cache operation on the blocking pool and waits for it
async fn blocking<T, F>(op: F) -> Result<T>
where
    F: FnOnce(&'static SharedCache) -> Result<T, CacheError> + Send + 'static,
    T: Send + 'static,
{
    let cache = global::instance()?;
    let value = tokio::task::spawn_blocking(move || op(cache))
        .await
        .context("String cache task failed")??;
    Ok(value)
}

fn open_store(config: &Config) -> Result<()> {
    debug!(store = %config.store_path.display(), "opening string store");
    match global::install(FileBackend::new(Some(config.store_path.clone()))) {
        Ok(_) | Err(CacheError::AlreadyInstalled) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Prints the value of `key`. Returns false when there is nothing to print.
pub async fn get(key: String, default: Option<String>, config: &Config) -> Result<bool> {
    open_store(config)?;

    let lookup_key = key.clone();
    let value = blocking(move |cache| cache.get(&lookup_key, default.as_deref()))
        .await
        .with_context(|| format!("Failed to look up '{}'", key))?;

    match value {
        Some(value) => {
            println!("{}", value);
            Ok(true)
        }
        None => {
            eprintln!("✗ No string stored for '{}'", key);
            Ok(false)
        }
    }
}

pub async fn set(key: String, value: String, config: &Config) -> Result<()> {
    open_store(config)?;

    let store_key = key.clone();
    blocking(move |cache| cache.set(&store_key, &value))
        .await
        .with_context(|| format!("Failed to store '{}'", key))?;

    if config.verbose {
        println!("✓ Stored '{}'", key);
    }
    Ok(())
}

pub async fn list(json: bool, placeholders: bool, config: &Config) -> Result<()> {
    open_store(config)?;

    let strings = blocking(|cache| cache.get_all())
        .await
        .context("Failed to load strings")?;

    if json {
        let content =
            serde_json::to_string_pretty(&strings).context("Failed to serialize strings")?;
        println!("{}", content);
        return Ok(());
    }

    if strings.is_empty() {
        println!("No strings stored");
        return Ok(());
    }

    for (key, value) in &strings {
        if placeholders {
            let names = template::placeholders(value);
            if names.is_empty() {
                println!("{} = {}", key, value);
            } else {
                println!("{} = {}  [{}]", key, value, names.join(", "));
            }
        } else {
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

/// Prints the rendered value of `key`. Returns false when the key has no
/// value and no default was given.
pub async fn assign(
    key: String,
    vars: Vec<(String, String)>,
    default: Option<String>,
    config: &Config,
) -> Result<bool> {
    open_store(config)?;

    let lookup_key = key.clone();
    let rendered = blocking(move |cache| {
        let pairs: Vec<(&str, &str)> = vars
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        cache.assign(&lookup_key, &pairs, default.as_deref())
    })
    .await
    .with_context(|| format!("Failed to render '{}'", key))?;

    match rendered {
        Some(text) => {
            println!("{}", text);
            Ok(true)
        }
        None => {
            eprintln!("✗ No string stored for '{}'", key);
            Ok(false)
        }
    }
}
