#![allow(dead_code)]

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weft::{effect, Effect};

/// Installs a test subscriber once per binary; `RUST_LOG` controls output.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weft_render=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// An effect that yields `text` after `delay` of (tokio) time.
pub fn delayed(text: &str, delay: Duration) -> Effect {
    let text = text.to_string();
    effect(move || {
        let text = text.clone();
        async move {
            tokio::time::sleep(delay).await;
            Ok(text)
        }
    })
}
