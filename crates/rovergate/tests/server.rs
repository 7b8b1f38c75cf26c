//! WebSocket round trips against a real `GatewayServer`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rovergate::prelude::*;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One fixed rover that only ever reports where it was asked to go.
struct EchoSim;

impl Simulation for EchoSim {
    fn join(&mut self, _player: PlayerId, _name: &str) -> Option<Arrival> {
        Some(Arrival {
            start: Position::new(2, 3),
            neighbors: vec![vec![0; 3]; 3],
            map: vec![vec![0; 4]; 4],
            target: Position::new(0, 0),
            orientation: Orientation::East,
        })
    }

    fn move_ground(
        &mut self,
        _player: PlayerId,
        direction: Direction,
    ) -> Result<GroundReport, SimulationError> {
        if direction == Direction::Backward {
            return Err(SimulationError::new("reverse gear broken"));
        }
        Ok(GroundReport {
            position: Position::new(2, 4),
            power: 99,
            neighbors: vec![vec![0; 3]; 3],
            message: "rolled".into(),
            orientation: Orientation::East,
        })
    }

    fn move_aerial(
        &mut self,
        _player: PlayerId,
        destination: Position,
    ) -> Result<AerialReport, SimulationError> {
        Ok(AerialReport {
            position: destination,
            power: 95,
            neighbors: vec![vec![0; 3]; 3],
            message: "flown".into(),
        })
    }
}

/// Starts a server on a free port. Dropping the returned sender stops it.
async fn start_server(idle: Duration) -> (String, oneshot::Sender<()>) {
    let registry = Arc::new(SessionRegistry::default());
    registry
        .provision(SessionId::new("mars-1"), SessionConfig::default(), EchoSim)
        .await
        .unwrap();
    let gateway = Arc::new(Gateway::new(registry, "s3cret", TracingObserver));

    let server = GatewayServer::builder()
        .bind("127.0.0.1:0")
        .idle_timeout(idle)
        .build(gateway)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(server.run_until(async move {
        let _ = stop_rx.await;
    }));

    (format!("ws://{addr}"), stop_tx)
}

async fn connect(url: &str) -> Client {
    let (ws, _) = connect_async(url).await.expect("connect should succeed");
    ws
}

async fn call(ws: &mut Client, frame: Value) -> Value {
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
    read_json(ws).await
}

async fn read_json(ws: &mut Client) -> Value {
    loop {
        match ws.next().await.expect("stream ended").unwrap() {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Binary(data) => return serde_json::from_slice(&data).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_websocket_join_start_move_round_trip() {
    let (url, _stop) = start_server(Duration::from_secs(30)).await;
    let mut ws = connect(&url).await;

    let joined = call(
        &mut ws,
        json!({"id": 1, "request": {"type": "Join", "session_id": "mars-1", "player_name": "alice"}}),
    )
    .await;
    assert_eq!(joined["id"], 1);
    assert_eq!(joined["response"]["type"], "Joined");
    assert_eq!(joined["response"]["start_x"], 2);
    assert_eq!(joined["response"]["start_y"], 3);
    assert_eq!(joined["response"]["orientation"], "East");
    let token = joined["response"]["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 32);

    let early = call(
        &mut ws,
        json!({"id": 2, "request": {"type": "MoveGround", "token": token, "direction": "Forward"}}),
    )
    .await;
    assert_eq!(early["response"]["type"], "Error");
    assert_eq!(early["response"]["kind"], "wrong_state");

    let started = call(
        &mut ws,
        json!({"id": 3, "request": {"type": "AdminStart", "session_id": "mars-1", "secret": "s3cret", "recharge_rate": 2}}),
    )
    .await;
    assert_eq!(started["response"]["type"], "Started");

    let moved = call(
        &mut ws,
        json!({"id": 4, "request": {"type": "MoveGround", "token": token, "direction": "Forward"}}),
    )
    .await;
    assert_eq!(moved["id"], 4);
    assert_eq!(moved["response"]["type"], "GroundMoved");
    assert_eq!(moved["response"]["x"], 2);
    assert_eq!(moved["response"]["y"], 4);
    assert_eq!(moved["response"]["power"], 99);

    let flown = call(
        &mut ws,
        json!({"id": 5, "request": {"type": "MoveAerial", "token": token, "dest_row": 7, "dest_col": 1}}),
    )
    .await;
    assert_eq!(flown["response"]["type"], "AerialMoved");
    assert_eq!(flown["response"]["x"], 7);
    assert_eq!(flown["response"]["y"], 1);

    let rejected = call(
        &mut ws,
        json!({"id": 6, "request": {"type": "MoveGround", "token": token, "direction": "Backward"}}),
    )
    .await;
    assert_eq!(rejected["response"]["kind"], "move_rejected");
    assert!(
        rejected["response"]["detail"]
            .as_str()
            .unwrap()
            .contains("reverse gear broken")
    );

    let status = call(
        &mut ws,
        json!({"id": 7, "request": {"type": "Status", "token": token}}),
    )
    .await;
    assert_eq!(status["response"], json!({"type": "Status", "state": "Playing"}));
}

#[tokio::test]
async fn test_websocket_bad_frame_gets_bad_request_and_connection_survives() {
    let (url, _stop) = start_server(Duration::from_secs(30)).await;
    let mut ws = connect(&url).await;

    ws.send(Message::Text("{not json".into())).await.unwrap();
    let reply = read_json(&mut ws).await;
    assert_eq!(reply["id"], 0);
    assert_eq!(reply["response"]["type"], "Error");
    assert_eq!(reply["response"]["kind"], "bad_request");
    assert_eq!(reply["response"]["title"], "Bad request");

    let bogus = call(
        &mut ws,
        json!({"id": 9, "request": {"type": "Status", "token": "bogus"}}),
    )
    .await;
    assert_eq!(bogus["id"], 9);
    assert_eq!(bogus["response"]["kind"], "unknown_token");
}

#[tokio::test]
async fn test_websocket_wrong_secret_is_invalid_secret() {
    let (url, _stop) = start_server(Duration::from_secs(30)).await;
    let mut ws = connect(&url).await;

    let reply = call(
        &mut ws,
        json!({"id": 1, "request": {"type": "AdminStart", "session_id": "mars-1", "secret": "guess", "recharge_rate": 0}}),
    )
    .await;

    assert_eq!(reply["response"]["kind"], "invalid_secret");
}

#[tokio::test]
async fn test_websocket_idle_connection_is_closed() {
    let (url, _stop) = start_server(Duration::from_millis(100)).await;
    let mut ws = connect(&url).await;

    let next = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;

    assert!(next.is_ok(), "server should close an idle connection");
}

#[tokio::test]
async fn test_builder_serves_gateway_with_custom_observer() {
    let registry = Arc::new(SessionRegistry::default());
    registry
        .provision(SessionId::new("mars-1"), SessionConfig::default(), EchoSim)
        .await
        .unwrap();
    let observer = Arc::new(CountingObserver::new());
    let gateway = Arc::new(Gateway::new(registry, "s3cret", Arc::clone(&observer)));
    let server = GatewayServer::builder()
        .bind("127.0.0.1:0")
        .build(gateway)
        .await
        .unwrap();
    let url = format!("ws://{}", server.local_addr().unwrap());
    let (_stop, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(server.run_until(async move {
        let _ = stop_rx.await;
    }));
    let mut ws = connect(&url).await;

    let joined = call(
        &mut ws,
        json!({"id": 1, "request": {"type": "Join", "session_id": "mars-1", "player_name": "alice"}}),
    )
    .await;
    ws.send(Message::Text("[]".into())).await.unwrap();
    let rejected = read_json(&mut ws).await;

    assert_eq!(joined["response"]["type"], "Joined");
    assert_eq!(rejected["response"]["kind"], "bad_request");
    let counts = observer.counts();
    assert_eq!(counts.join_successes, 1);
    assert_eq!(counts.errors, 1);
}
