//! Per-connection loop: read a frame, decode, dispatch, reply.

use std::sync::Arc;

use rovergate_protocol::{
    Codec, ErrorKind, RequestEnvelope, Response, ResponseEnvelope,
};

use crate::GateError;
use crate::observer::Observer;
use crate::server::ServerState;
use crate::transport::WsConnection;

/// Serves one connection until the client closes it, goes idle, or the
/// socket fails.
///
/// Requests on a connection are answered in order. A frame that doesn't
/// decode gets a `bad_request` reply with id 0 and the connection stays
/// open.
pub(crate) async fn handle_connection<O: Observer>(
    mut conn: WsConnection,
    state: Arc<ServerState<O>>,
) -> Result<(), GateError> {
    let conn_id = conn.id();

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed by client");
                break;
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                conn.close().await;
                break;
            }
        };

        let reply = match state.codec.decode::<RequestEnvelope>(&data) {
            Ok(RequestEnvelope { id, request }) => {
                tracing::debug!(%conn_id, id, request = request.name(), "request");
                ResponseEnvelope {
                    id,
                    response: state.gateway.handle(request).await,
                }
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "undecodable frame");
                state.gateway.observer().request_failed(ErrorKind::BadRequest);
                ResponseEnvelope {
                    id: 0,
                    response: Response::error(ErrorKind::BadRequest, e.to_string()),
                }
            }
        };

        let bytes = state.codec.encode(&reply)?;
        conn.send(bytes).await?;
    }

    Ok(())
}
