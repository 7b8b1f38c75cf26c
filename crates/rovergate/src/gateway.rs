//! The transport-agnostic request boundary.
//!
//! [`Gateway`] owns the orchestrator and the admin gate, turns session-level
//! results into client payloads, and fires [`Observer`] hooks. Transports
//! call [`Gateway::handle`] with a decoded [`Request`] and send back whatever
//! [`Response`] comes out.

use std::sync::Arc;
use std::time::Instant;

use rovergate_protocol::{
    AerialMoveResponse, Direction, GroundMoveResponse, JoinResponse,
    LifecycleState, Position, Request, Response, SessionId, StartOptions,
    Token,
};
use rovergate_session::{AerialReport, GroundReport, SessionRegistry};

use crate::admin::AdminGate;
use crate::observer::{Observer, TracingObserver};
use crate::orchestrator::MoveOrchestrator;
use crate::GateError;

/// Entry point for every client request.
///
/// Shared across connection tasks behind an `Arc`; every method takes
/// `&self`.
pub struct Gateway<O: Observer = TracingObserver> {
    registry: Arc<SessionRegistry>,
    orchestrator: MoveOrchestrator,
    admin: AdminGate,
    observer: O,
}

impl<O: Observer> Gateway<O> {
    /// Builds a gateway over `registry`. `admin_secret` guards AdminStart.
    pub fn new(
        registry: Arc<SessionRegistry>,
        admin_secret: impl Into<String>,
        observer: O,
    ) -> Self {
        Self {
            orchestrator: MoveOrchestrator::new(Arc::clone(&registry)),
            admin: AdminGate::new(Arc::clone(&registry), admin_secret),
            registry,
            observer,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Admits `player_name` to `session_id`.
    pub async fn join(
        &self,
        session_id: &SessionId,
        player_name: &str,
    ) -> Result<JoinResponse, GateError> {
        self.observer.join_attempted(session_id);

        let result = async {
            let session = self.registry.get(session_id).await?;
            let ticket = session.join(player_name).await?;
            Ok::<_, GateError>(ticket)
        }
        .await;

        let ticket = self.observe_failure(result)?;
        self.observer.join_succeeded(session_id);

        let arrival = ticket.arrival;
        Ok(JoinResponse {
            token: ticket.token,
            start_x: arrival.start.row,
            start_y: arrival.start.col,
            neighbors: arrival.neighbors,
            map: arrival.map,
            target_x: arrival.target.row,
            target_y: arrival.target.col,
            orientation: arrival.orientation,
        })
    }

    /// Lifecycle state of the session behind `token`.
    pub async fn status(
        &self,
        token: &Token,
    ) -> Result<LifecycleState, GateError> {
        let result = self.orchestrator.authorize(token).await;
        let session = self.observe_failure(result)?;
        Ok(session.state())
    }

    pub async fn move_ground(
        &self,
        token: &Token,
        direction: Direction,
    ) -> Result<GroundMoveResponse, GateError> {
        let started = Instant::now();
        let result = self.orchestrator.move_ground(token, direction).await;
        let report = self.observe_failure(result)?;
        self.observer.move_completed("ground", started.elapsed());
        Ok(ground_response(report))
    }

    /// `dest_row`/`dest_col` name the destination cell.
    pub async fn move_aerial(
        &self,
        token: &Token,
        dest_row: i32,
        dest_col: i32,
    ) -> Result<AerialMoveResponse, GateError> {
        let started = Instant::now();
        let destination = Position::new(dest_row, dest_col);
        let result = self.orchestrator.move_aerial(token, destination).await;
        let report = self.observe_failure(result)?;
        self.observer.move_completed("aerial", started.elapsed());
        Ok(aerial_response(report))
    }

    /// Operator start. See [`AdminGate::start_session`].
    pub async fn admin_start(
        &self,
        session_id: &SessionId,
        secret: &str,
        recharge_rate: u32,
    ) -> Result<(), GateError> {
        let options = StartOptions { recharge_rate };
        let result = self.admin.start_session(session_id, secret, options).await;
        self.observe_failure(result)?;
        self.observer.session_started(session_id);
        Ok(())
    }

    /// Runs one request to completion. Failures become
    /// [`Response::Error`]; this never returns a Rust error.
    pub async fn handle(&self, request: Request) -> Response {
        let result = match request {
            Request::Join {
                session_id,
                player_name,
            } => self
                .join(&session_id, &player_name)
                .await
                .map(Response::Joined),
            Request::Status { token } => self
                .status(&token)
                .await
                .map(|state| Response::Status { state }),
            Request::MoveGround { token, direction } => self
                .move_ground(&token, direction)
                .await
                .map(Response::GroundMoved),
            Request::MoveAerial {
                token,
                dest_row,
                dest_col,
            } => self
                .move_aerial(&token, dest_row, dest_col)
                .await
                .map(Response::AerialMoved),
            Request::AdminStart {
                session_id,
                secret,
                recharge_rate,
            } => self
                .admin_start(&session_id, &secret, recharge_rate)
                .await
                .map(|()| Response::Started),
        };

        result.unwrap_or_else(|e| error_response(&e))
    }

    fn observe_failure<T>(
        &self,
        result: Result<T, GateError>,
    ) -> Result<T, GateError> {
        if let Err(e) = &result {
            self.observer.request_failed(e.kind());
        }
        result
    }
}

/// Converts an error into the wire shape: stable kind, fixed title, and the
/// error's own message as the detail.
pub fn error_response(err: &GateError) -> Response {
    Response::error(err.kind(), err.to_string())
}

fn ground_response(report: GroundReport) -> GroundMoveResponse {
    GroundMoveResponse {
        x: report.position.row,
        y: report.position.col,
        power: report.power,
        neighbors: report.neighbors,
        message: report.message,
        orientation: report.orientation,
    }
}

fn aerial_response(report: AerialReport) -> AerialMoveResponse {
    AerialMoveResponse {
        x: report.position.row,
        y: report.position.col,
        power: report.power,
        neighbors: report.neighbors,
        message: report.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rovergate_protocol::ErrorKind;

    #[test]
    fn test_error_response_uses_kind_and_message() {
        let response = error_response(&GateError::MoveRejected("cliff".into()));
        assert_eq!(
            response,
            Response::Error {
                kind: ErrorKind::MoveRejected,
                title: "Move rejected".into(),
                detail: "move rejected: cliff".into(),
            }
        );
    }

    #[test]
    fn test_ground_response_maps_row_to_x() {
        let report = GroundReport {
            position: Position::new(3, 7),
            power: 10,
            neighbors: vec![],
            message: String::new(),
            orientation: Default::default(),
        };
        let response = ground_response(report);
        assert_eq!((response.x, response.y), (3, 7));
    }

    #[tokio::test]
    async fn test_handle_status_unknown_token_is_error_response() {
        let gateway = Gateway::new(
            Arc::new(SessionRegistry::default()),
            "secret",
            TracingObserver,
        );
        let response = gateway
            .handle(Request::Status { token: Token::new("bogus") })
            .await;
        assert!(matches!(
            response,
            Response::Error { kind: ErrorKind::UnknownToken, .. }
        ));
    }
}
