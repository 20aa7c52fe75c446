use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber.
///
/// An explicit filter wins over `RUST_LOG`, which wins over `info`.
pub(crate) fn init(explicit: Option<&str>) -> Result<()> {
    let filter = resolve_filter(explicit)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_timer(fmt::time::uptime()))
        .try_init()
        .context("failed to install tracing subscriber")
}

fn resolve_filter(explicit: Option<&str>) -> Result<EnvFilter> {
    match explicit {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_is_used_verbatim() {
        let filter = resolve_filter(Some("warpfield_system_starfield=debug,warn"))
            .expect("valid directives");

        assert!(filter.to_string().contains("warpfield_system_starfield=debug"));
    }

    #[test]
    fn bare_level_filter_is_accepted() {
        let filter = resolve_filter(Some("debug")).expect("valid level");

        assert_eq!(filter.to_string(), "debug");
    }
}
