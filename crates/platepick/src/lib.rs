//! # Platepick
//!
//! Live rooms where a group of friends picks a restaurant together.
//!
//! Members join a room with a six-character invite code, add suggestions
//! (by hand or from an AI provider), approve or reject candidates in
//! voting rounds, and ask the server to pick a winner with one of several
//! strategies. Every change is broadcast to everyone subscribed to the
//! room's topic.
//!
//! The engine ([`RoomSession`]) is transport-agnostic: it only needs a
//! [`MessageBus`]. [`PlatepickServer`] wires it to a WebSocket gateway.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use platepick::prelude::*;
//!
//! # async fn run() -> Result<(), PlatepickError> {
//! let directory = InMemoryDirectory::new();
//! directory.insert(UserId(1), "alice");
//!
//! let server = PlatepickServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(FallbackCatalog::default(), directory)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod bus;
mod config;
mod error;
mod handler;
mod server;
mod session;

pub use bus::{BusError, DEFAULT_TOPIC_CAPACITY, MessageBus, TopicBus};
pub use config::ServerConfig;
pub use error::{ErrorKind, PlatepickError};
pub use server::{PlatepickServer, PlatepickServerBuilder};
pub use session::{
    INVALID_VOTE_MESSAGE, NO_SELECTION_MESSAGE, RoomSession, UNANIMOUS_EXPLANATION, VoteRound,
};

/// Everything needed to run a server or drive a session in one import.
pub mod prelude {
    pub use crate::{
        BusError, ErrorKind, MessageBus, PlatepickError, PlatepickServer,
        PlatepickServerBuilder, RoomSession, ServerConfig, TopicBus, VoteRound,
    };
    pub use platepick_protocol::{
        ClientAction, ClientFrame, InviteCode, RoomEvent, RoomId, SelectionStrategy,
        ServerFrame, UserId, VoteSnapshot, room_topic,
    };
    pub use platepick_room::{InMemoryDirectory, Member, Room, RoomRegistry, UserDirectory};
    pub use platepick_suggest::{
        FallbackCatalog, OpenAiConfig, OpenAiSuggester, SuggestError, SuggestionProvider,
        WithFallback,
    };
}
