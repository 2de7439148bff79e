use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the console subscriber. `RUST_LOG` wins when set; otherwise
/// debug mode logs at `debug` and production at `info`.
pub fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let fallback = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
