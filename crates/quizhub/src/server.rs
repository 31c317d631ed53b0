//! Server state, the websocket accept loop, and the empty-room sweeper.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use quizhub_bank::QuestionBank;
use quizhub_protocol::JsonCodec;
use quizhub_room::RoomRegistry;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::GatewayError;
use crate::handler::handle_connection;

/// Shared server state passed to every connection handler and HTTP route.
///
/// The registry sits behind one async mutex: create/lookup/delete/sweep
/// are serialized against each other, so a sweep can never delete a room
/// between a join's existence-check and its insert. Room *operations*
/// themselves run inside per-room actors and never hold this lock.
pub struct GatewayState {
    pub registry: Mutex<RoomRegistry>,
    pub bank: Arc<QuestionBank>,
    pub codec: JsonCodec,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(registry: RoomRegistry) -> SharedState {
        let bank = registry.bank().clone();
        Arc::new(Self {
            registry: Mutex::new(registry),
            bank,
            codec: JsonCodec,
        })
    }
}

/// The realtime websocket listener.
pub struct GatewayServer {
    listener: TcpListener,
    state: SharedState,
}

impl GatewayServer {
    /// Binds the websocket listener to `addr`.
    pub async fn bind(addr: &str, state: SharedState) -> Result<Self, GatewayError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr, "websocket gateway listening");
        Ok(Self { listener, state })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(self) -> Result<(), GatewayError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
                            tracing::debug!(%addr, error = %e, "connection ended with error");
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

/// Spawns the periodic empty-room sweep.
///
/// Deletion is deliberately decoupled from disconnect events: a room that
/// just lost its last participant survives until the next sweep, which
/// keeps a host mid-reconnect from losing their room.
pub fn spawn_sweeper(state: SharedState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately; skip it so a freshly
        // created room is never swept at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.registry.lock().await.sweep_empty().await;
        }
    })
}
