use std::collections::HashMap;
use std::sync::Arc;

use rovergate::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

const SIZE: i32 = 12;
const ROCK: i32 = 1;
const OUTSIDE: i32 = -1;
const FULL_CHARGE: u32 = 100;
const GROUND_COST: u32 = 1;
/// Aerial moves cost this much per cell of Manhattan distance.
const AERIAL_COST_PER_CELL: u32 = 2;

/// A fixed crater field: rocks on a deterministic pattern, clear start and
/// target corners.
fn terrain() -> Grid {
    (0..SIZE)
        .map(|row| {
            (0..SIZE)
                .map(|col| {
                    let rocky = (row * 7 + col * 5) % 11 == 0;
                    let corner = (row >= SIZE - 2 && col <= 1) || (row <= 1 && col >= SIZE - 2);
                    if rocky && !corner { ROCK } else { 0 }
                })
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

struct Rover {
    ground: Position,
    orientation: Orientation,
    drone: Position,
    power: u32,
}

/// Every player gets a rover and a drone. The mission is over as soon as
/// any rover reaches the target.
struct MarsField {
    grid: Grid,
    target: Position,
    start: Position,
    rovers: HashMap<PlayerId, Rover>,
    max_rovers: usize,
    recharge: u32,
    reached: bool,
}

impl MarsField {
    fn new(max_rovers: usize) -> Self {
        Self {
            grid: terrain(),
            target: Position::new(0, SIZE - 1),
            start: Position::new(SIZE - 1, 0),
            rovers: HashMap::new(),
            max_rovers,
            recharge: 0,
            reached: false,
        }
    }

    fn cell(&self, p: Position) -> i32 {
        if (0..SIZE).contains(&p.row) && (0..SIZE).contains(&p.col) {
            self.grid[p.row as usize][p.col as usize]
        } else {
            OUTSIDE
        }
    }

    /// The 3x3 window centred on `p`. Cells off the map read as -1.
    fn neighbors(&self, p: Position) -> Grid {
        (-1..=1)
            .map(|dr| {
                (-1..=1)
                    .map(|dc| self.cell(Position::new(p.row + dr, p.col + dc)))
                    .collect()
            })
            .collect()
    }

    fn rover(&mut self, player: PlayerId) -> Result<&mut Rover, SimulationError> {
        self.rovers
            .get_mut(&player)
            .ok_or_else(|| SimulationError::new(format!("no rover for {player}")))
    }

    fn charge(power: u32, cost: u32, recharge: u32) -> Result<u32, SimulationError> {
        if power < cost {
            return Err(SimulationError::new(format!(
                "not enough power: need {cost}, have {power}"
            )));
        }
        Ok((power - cost).saturating_add(recharge).min(FULL_CHARGE))
    }
}

impl Simulation for MarsField {
    fn join(&mut self, player: PlayerId, _name: &str) -> Option<Arrival> {
        if self.rovers.len() >= self.max_rovers {
            return None;
        }
        self.rovers.insert(
            player,
            Rover {
                ground: self.start,
                orientation: Orientation::North,
                drone: self.start,
                power: FULL_CHARGE,
            },
        );
        Some(Arrival {
            start: self.start,
            neighbors: self.neighbors(self.start),
            map: self.grid.clone(),
            target: self.target,
            orientation: Orientation::North,
        })
    }

    fn move_ground(
        &mut self,
        player: PlayerId,
        direction: Direction,
    ) -> Result<GroundReport, SimulationError> {
        let recharge = self.recharge;
        let (position, orientation, power) = {
            let rover = self.rover(player)?;
            (rover.ground, rover.orientation, rover.power)
        };

        let (next, orientation) = match direction {
            Direction::Left => (position, orientation.turned_left()),
            Direction::Right => (position, orientation.turned_right()),
            Direction::Forward | Direction::Backward => {
                let (dr, dc) = orientation.step();
                let sign = if direction == Direction::Forward { 1 } else { -1 };
                (
                    Position::new(position.row + sign * dr, position.col + sign * dc),
                    orientation,
                )
            }
        };
        match self.cell(next) {
            OUTSIDE => return Err(SimulationError::new("edge of the map")),
            ROCK => return Err(SimulationError::new(format!("rock at {next}"))),
            _ => {}
        }
        let power = Self::charge(power, GROUND_COST, recharge)?;

        let rover = self.rover(player)?;
        rover.ground = next;
        rover.orientation = orientation;
        rover.power = power;

        let message = if next == self.target {
            self.reached = true;
            "target reached".to_string()
        } else {
            String::new()
        };

        Ok(GroundReport {
            position: next,
            power,
            neighbors: self.neighbors(next),
            message,
            orientation,
        })
    }

    fn move_aerial(
        &mut self,
        player: PlayerId,
        destination: Position,
    ) -> Result<AerialReport, SimulationError> {
        if self.cell(destination) == OUTSIDE {
            return Err(SimulationError::new(format!("{destination} is off the map")));
        }
        let recharge = self.recharge;
        let rover = self.rover(player)?;
        let distance = (destination.row - rover.drone.row).unsigned_abs()
            + (destination.col - rover.drone.col).unsigned_abs();
        let power = Self::charge(rover.power, distance * AERIAL_COST_PER_CELL, recharge)?;
        rover.drone = destination;
        rover.power = power;

        Ok(AerialReport {
            position: destination,
            power,
            neighbors: self.neighbors(destination),
            message: format!("flew {distance} cells"),
        })
    }

    fn start(&mut self, options: &StartOptions) {
        self.recharge = options.recharge_rate;
    }

    fn is_complete(&self) -> bool {
        self.reached
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

/// Settings read from the environment.
#[derive(Debug)]
struct Settings {
    bind: String,
    admin_secret: String,
    sessions: Vec<SessionId>,
}

impl Settings {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let admin_secret = lookup("ROVERGATE_ADMIN_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or("ROVERGATE_ADMIN_SECRET must be set")?;
        let bind = lookup("ROVERGATE_BIND").unwrap_or_else(|| "127.0.0.1:8080".into());
        let sessions = lookup("ROVERGATE_SESSIONS")
            .unwrap_or_else(|| "mars-1".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SessionId::new)
            .collect();
        Ok(Self {
            bind,
            admin_secret,
            sessions,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_lookup(|key| std::env::var(key).ok())?;

    let registry = Arc::new(SessionRegistry::default());
    let config = SessionConfig::default();
    for session_id in &settings.sessions {
        registry
            .provision(session_id.clone(), config.clone(), MarsField::new(config.max_players))
            .await?;
    }

    let gateway = Arc::new(Gateway::new(registry, settings.admin_secret, TracingObserver));
    let server = GatewayServer::builder()
        .bind(&settings.bind)
        .build(gateway)
        .await?;

    tracing::info!(
        addr = %server.local_addr()?,
        sessions = settings.sessions.len(),
        "mars rover server ready"
    );

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
