//! # Rovergate
//!
//! Session gateway for hosted rover exploration games.
//!
//! Operators provision sessions, players join them and receive an opaque
//! token, and every later request carries that token. Each session is
//! driven by a [`Simulation`] you supply; Rovergate handles registration,
//! token issue, the Joining → Playing → Completed lifecycle, and routing of
//! ground and aerial moves to the right session.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rovergate::prelude::*;
//!
//! let registry = Arc::new(SessionRegistry::default());
//! registry
//!     .provision(SessionId::new("mars-1"), SessionConfig::default(), MySim::new())
//!     .await?;
//!
//! let gateway = Arc::new(Gateway::new(registry, "s3cret", TracingObserver));
//! GatewayServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(gateway)
//!     .await?
//!     .run()
//!     .await
//! ```

mod admin;
mod error;
mod gateway;
mod handler;
mod observer;
mod orchestrator;
mod server;
mod transport;

pub use admin::AdminGate;
pub use error::GateError;
pub use gateway::{Gateway, error_response};
pub use observer::{CountingObserver, ObservedCounts, Observer, TracingObserver};
pub use orchestrator::MoveOrchestrator;
pub use server::{GatewayServer, GatewayServerBuilder};
pub use transport::{ConnectionId, TransportError, WsConnection, WsListener};

pub use rovergate_auth::{AuthError, TokenAuthority};
pub use rovergate_protocol as protocol;
pub use rovergate_session::{
    AerialReport, Arrival, GroundReport, SessionConfig, SessionError,
    SessionHandle, SessionInfo, SessionRegistry, Simulation, SimulationError,
};

/// Everything needed to host a game.
pub mod prelude {
    pub use crate::{
        AerialReport, Arrival, CountingObserver, GateError, Gateway,
        GatewayServer, GroundReport, Observer, SessionConfig,
        SessionRegistry, Simulation, SimulationError, TokenAuthority,
        TracingObserver,
    };
    pub use rovergate_protocol::{
        Direction, Grid, LifecycleState, Orientation, PlayerId, Position,
        SessionId, StartOptions, Token,
    };
}
