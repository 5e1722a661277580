//! `PlatepickServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session → bus.

use std::sync::Arc;
use std::time::Duration;

use platepick_protocol::JsonCodec;
use platepick_room::{RoomRegistry, UserDirectory};
use platepick_suggest::SuggestionProvider;
use platepick_transport::WebSocketListener;

use crate::bus::TopicBus;
use crate::config::ServerConfig;
use crate::handler::handle_connection;
use crate::session::RoomSession;
use crate::PlatepickError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<P> {
    pub(crate) session: RoomSession<P, TopicBus>,
    pub(crate) bus: Arc<TopicBus>,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Platepick server.
///
/// # Example
///
/// ```rust,ignore
/// use platepick::prelude::*;
///
/// let server = PlatepickServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(FallbackCatalog::default(), InMemoryDirectory::new())
///     .await?;
/// server.run().await
/// ```
pub struct PlatepickServerBuilder {
    config: ServerConfig,
}

impl PlatepickServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn topic_capacity(mut self, capacity: usize) -> Self {
        self.config.topic_capacity = capacity;
        self
    }

    /// Binds the listener and wires up the session engine.
    pub async fn build<P: SuggestionProvider>(
        self,
        provider: P,
        directory: impl UserDirectory,
    ) -> Result<PlatepickServer<P>, PlatepickError> {
        let listener = WebSocketListener::bind(&self.config.bind_addr).await?;

        let bus = Arc::new(TopicBus::new(self.config.topic_capacity));
        let session = RoomSession::new(
            Arc::new(RoomRegistry::new()),
            Arc::new(provider),
            Arc::new(directory),
            Arc::clone(&bus),
        );

        let state = Arc::new(ServerState {
            session,
            bus,
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(PlatepickServer { listener, state })
    }
}

impl Default for PlatepickServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Platepick server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PlatepickServer<P> {
    listener: WebSocketListener,
    state: Arc<ServerState<P>>,
}

impl<P: SuggestionProvider> PlatepickServer<P> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// The session engine, for seeding rooms or inspecting state.
    pub fn session(&self) -> &RoomSession<P, TopicBus> {
        &self.state.session
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each accepted connection gets its own handler task.
    pub async fn run(self) -> Result<(), PlatepickError> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "Platepick server running");

        loop {
            match self.listener.accept().await {
                Ok((tx, rx)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(tx, rx, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
