//! Example lifecycle-manager flow against the in-memory backend.
//!
//! Run with: cargo run -p lifecycle-demo
//!
//! Drives the full handler surface the way a web framework would across one
//! request cycle: open, hydrate, persist, log out, periodic sweep, close.

use docstore_sessions_core::SessionHandler;
use docstore_sessions_store::{SessionStore, SessionStoreConfig, backend::MemoryConnection};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let conn = MemoryConnection::new();
    let store = SessionStore::connect(SessionStoreConfig::default(), &conn)
        .await
        .expect("connect session store");

    // The lifecycle manager owns id generation, not the store.
    let session_id = Uuid::new_v4().to_string();

    store.open().await.expect("open");

    let hydrated = store.read(&session_id).await.expect("read");
    tracing::info!(%session_id, bytes = hydrated.len(), "fresh session hydrated");

    let persisted = store
        .write(&session_id, b"user_id=42; theme=dark")
        .await
        .expect("write");
    tracing::info!(%session_id, persisted, "session state persisted");

    let state = store.read(&session_id).await.expect("read");
    tracing::info!(
        %session_id,
        state = %String::from_utf8_lossy(&state),
        "session state read back"
    );

    let destroyed = store.destroy(&session_id).await.expect("destroy");
    tracing::info!(%session_id, destroyed, "session destroyed on logout");

    // What a cron-like trigger would run; nothing is old enough to sweep.
    let swept = store.cleanup(3600).await.expect("cleanup");
    tracing::info!(swept, "expiry sweep finished");

    store.close().await.expect("close");
}
