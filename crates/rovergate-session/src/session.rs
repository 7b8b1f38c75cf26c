//! Session actor: an isolated Tokio task that owns one hosted game.
//!
//! Each session runs in its own task and talks to the outside world through
//! an mpsc channel. Whoever holds a [`SessionHandle`] sends a command plus a
//! oneshot "reply channel" and waits for the answer. Because the actor
//! processes one command at a time, joins, starts and moves on the same
//! session can never interleave, and no lock is needed around the
//! simulation.
//!
//! Read-only queries skip the queue entirely: the actor publishes a
//! [`SessionInfo`] snapshot on a `watch` channel after every change.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rovergate_auth::TokenAuthority;
use rovergate_protocol::{
    Direction, LifecycleState, PlayerId, Position, SessionId, StartOptions,
    Token,
};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{
    AerialReport, Arrival, GroundReport, SessionConfig, SessionError,
    SessionInfo, Simulation,
};

/// What a player asks one of their agents to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentCommand {
    /// Drive the ground rover.
    Ground(Direction),
    /// Fly the aerial scout to a cell.
    Aerial(Position),
}

impl AgentCommand {
    /// Short agent name, for log fields.
    pub fn agent(&self) -> &'static str {
        match self {
            Self::Ground(_) => "ground",
            Self::Aerial(_) => "aerial",
        }
    }
}

/// The simulation's answer to an [`AgentCommand`]. The variant always
/// matches the command's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReport {
    Ground(GroundReport),
    Aerial(AerialReport),
}

/// Everything a player receives on a successful join.
#[derive(Debug, Clone)]
pub struct JoinTicket {
    pub token: Token,
    pub player_id: PlayerId,
    pub arrival: Arrival,
}

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand {
    Join {
        name: String,
        reply: oneshot::Sender<Result<JoinTicket, SessionError>>,
    },
    Start {
        options: StartOptions,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Move {
        token: Token,
        command: AgentCommand,
        reply: oneshot::Sender<Result<AgentReport, SessionError>>,
    },
}

/// Handle to a running session actor.
///
/// Cheap to clone: an `mpsc::Sender` and a `watch::Receiver`. The registry
/// keeps one per session and hands out clones.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
    info: watch::Receiver<SessionInfo>,
}

impl SessionHandle {
    /// Returns the session's id.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Latest published snapshot. Never waits on the actor.
    pub fn snapshot(&self) -> SessionInfo {
        self.info.borrow().clone()
    }

    /// Latest published lifecycle state. Never waits on the actor.
    pub fn state(&self) -> LifecycleState {
        self.info.borrow().state
    }

    /// Admits a new player.
    ///
    /// Allowed while Joining and while Playing. On success the returned
    /// token is already resolvable through the [`TokenAuthority`].
    ///
    /// # Errors
    /// - [`SessionError::CapacityExceeded`]: no room for another player
    /// - [`SessionError::WrongState`]: the session is Completed
    /// - [`SessionError::MoveRejected`]: the simulation panicked while
    ///   placing the player
    /// - [`SessionError::Unavailable`]: the actor has stopped
    pub async fn join(
        &self,
        name: impl Into<String>,
    ) -> Result<JoinTicket, SessionError> {
        let name = name.into();
        self.request(|reply| SessionCommand::Join { name, reply }).await
    }

    /// Moves the session from Joining to Playing and freezes `options`.
    ///
    /// # Errors
    /// [`SessionError::InvalidTransition`] if the session is not Joining.
    /// A second start is an error, not a no-op. If the simulation panics
    /// in its own `start`, the result is [`SessionError::MoveRejected`] and
    /// the session stays Joining.
    pub async fn start(
        &self,
        options: StartOptions,
    ) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Start { options, reply })
            .await
    }

    /// Runs one agent move for the player holding `token`.
    ///
    /// # Errors
    /// - [`SessionError::WrongState`]: the session is not Playing
    /// - [`SessionError::UnknownPlayer`]: no player here holds `token`
    /// - [`SessionError::MoveRejected`]: the simulation refused the move or
    ///   panicked while making it
    pub async fn submit_move(
        &self,
        token: Token,
        command: AgentCommand,
    ) -> Result<AgentReport, SessionError> {
        self.request(|reply| SessionCommand::Move {
            token,
            command,
            reply,
        })
        .await
    }

    /// Sends a command built around a fresh reply channel and waits for the
    /// answer. A closed channel on either leg means the actor is gone.
    async fn request<T>(
        &self,
        build: impl FnOnce(
            oneshot::Sender<Result<T, SessionError>>,
        ) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| SessionError::Unavailable(self.session_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Unavailable(self.session_id.clone()))?
    }
}

/// The internal session state. Lives inside the actor task.
struct SessionActor<S: Simulation> {
    session_id: SessionId,
    state: LifecycleState,
    config: SessionConfig,
    options: Option<StartOptions>,
    /// Keyed by token: every move arrives with a token, never a player id.
    players: HashMap<Token, PlayerId>,
    next_player_id: u64,
    simulation: S,
    authority: Arc<TokenAuthority>,
    receiver: mpsc::Receiver<SessionCommand>,
    info: watch::Sender<SessionInfo>,
}

impl<S: Simulation> SessionActor<S> {
    /// Processes commands until every handle has been dropped.
    async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join { name, reply } => {
                    let result = self.handle_join(name).await;
                    let _ = reply.send(result);
                }
                SessionCommand::Start { options, reply } => {
                    let _ = reply.send(self.handle_start(options));
                }
                SessionCommand::Move {
                    token,
                    command,
                    reply,
                } => {
                    let _ = reply.send(self.handle_move(&token, command));
                }
            }
        }

        tracing::info!(session_id = %self.session_id, "session actor stopped");
    }

    async fn handle_join(
        &mut self,
        name: String,
    ) -> Result<JoinTicket, SessionError> {
        if !self.state.is_joinable() {
            return Err(self.wrong_state());
        }
        if self.players.len() >= self.config.max_players {
            return Err(SessionError::CapacityExceeded(self.session_id.clone()));
        }

        let player_id = PlayerId(self.next_player_id);
        let simulation = &mut self.simulation;
        let arrival = contain(|| simulation.join(player_id, &name))
            .map_err(|fault| {
                tracing::error!(
                    session_id = %self.session_id,
                    %player_id,
                    %fault,
                    "simulation panicked during join"
                );
                SessionError::MoveRejected(fault)
            })?
            .ok_or_else(|| SessionError::CapacityExceeded(self.session_id.clone()))?;
        self.next_player_id += 1;

        // The token must be resolvable before the player shows up in any
        // snapshot.
        let token = self.authority.issue(&self.session_id).await;
        self.players.insert(token.clone(), player_id);
        self.publish();

        tracing::info!(
            session_id = %self.session_id,
            %player_id,
            player_name = %name,
            players = self.players.len(),
            state = %self.state,
            "player joined"
        );

        Ok(JoinTicket {
            token,
            player_id,
            arrival,
        })
    }

    fn handle_start(
        &mut self,
        options: StartOptions,
    ) -> Result<(), SessionError> {
        if !self.state.can_transition_to(LifecycleState::Playing) {
            return Err(SessionError::InvalidTransition {
                session_id: self.session_id.clone(),
                from: self.state,
                to: LifecycleState::Playing,
            });
        }

        let simulation = &mut self.simulation;
        contain(|| simulation.start(&options)).map_err(|fault| {
            tracing::error!(
                session_id = %self.session_id,
                %fault,
                "simulation panicked during start"
            );
            SessionError::MoveRejected(fault)
        })?;
        self.options = Some(options);
        self.state = LifecycleState::Playing;
        self.publish();

        tracing::info!(
            session_id = %self.session_id,
            players = self.players.len(),
            recharge_rate = options.recharge_rate,
            "session started"
        );
        Ok(())
    }

    fn handle_move(
        &mut self,
        token: &Token,
        command: AgentCommand,
    ) -> Result<AgentReport, SessionError> {
        if !self.state.accepts_moves() {
            return Err(self.wrong_state());
        }
        let player_id = self
            .players
            .get(token)
            .copied()
            .ok_or_else(|| SessionError::UnknownPlayer(self.session_id.clone()))?;

        let simulation = &mut self.simulation;
        let outcome = contain(|| match command {
            AgentCommand::Ground(direction) => simulation
                .move_ground(player_id, direction)
                .map(AgentReport::Ground),
            AgentCommand::Aerial(destination) => simulation
                .move_aerial(player_id, destination)
                .map(AgentReport::Aerial),
        });
        let result = outcome.map_err(|fault| {
            tracing::error!(
                session_id = %self.session_id,
                %player_id,
                agent = command.agent(),
                %fault,
                "simulation panicked during move"
            );
            SessionError::MoveRejected(fault)
        })?;

        let report = result.map_err(|e| {
            tracing::debug!(
                session_id = %self.session_id,
                %player_id,
                agent = command.agent(),
                reason = %e,
                "move rejected by simulation"
            );
            SessionError::MoveRejected(e.0)
        })?;

        let simulation = &self.simulation;
        if contain(|| simulation.is_complete()).unwrap_or(false) {
            self.state = LifecycleState::Completed;
            self.publish();
            tracing::info!(session_id = %self.session_id, "session completed");
        }

        Ok(report)
    }

    fn wrong_state(&self) -> SessionError {
        SessionError::WrongState {
            session_id: self.session_id.clone(),
            state: self.state,
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            state: self.state,
            player_count: self.players.len(),
            max_players: self.config.max_players,
            options: self.options,
        }
    }

    /// Pushes a fresh snapshot to every handle.
    fn publish(&self) {
        // `send_replace` succeeds even when no receiver is listening.
        self.info.send_replace(self.info());
    }
}

/// Runs a simulation call, turning a panic into its message.
///
/// The simulation keeps whatever state it had when it panicked; the session
/// itself is untouched because nothing is committed before the call returns.
fn contain<T>(call: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "simulation panicked".to_string()
    }
}

/// Spawns a session actor and returns a handle to it.
///
/// The initial Joining snapshot is in place before the handle exists, so
/// nobody can observe a half-built session.
pub(crate) fn spawn_session<S: Simulation>(
    session_id: SessionId,
    config: SessionConfig,
    simulation: S,
    authority: Arc<TokenAuthority>,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
    let initial = SessionInfo {
        session_id: session_id.clone(),
        state: LifecycleState::Joining,
        player_count: 0,
        max_players: config.max_players,
        options: None,
    };
    let (info_tx, info_rx) = watch::channel(initial);

    let actor = SessionActor {
        session_id: session_id.clone(),
        state: LifecycleState::Joining,
        config,
        options: None,
        players: HashMap::new(),
        next_player_id: 1,
        simulation,
        authority,
        receiver: rx,
        info: info_tx,
    };

    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
        info: info_rx,
    }
}
