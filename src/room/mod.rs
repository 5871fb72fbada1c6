//! The room owns the authoritative session, its observers and the reveal timer.
//!
//! Every mutation broadcasts while still holding the session lock, so all observers receive
//! updates in the same order.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{Settings, SnapshotMode};
use crate::error::GameError;
use crate::game::session::Snapshot;
use crate::game::{FlipReveal, GameConfig, GameSession, PendingHide, Verdict};
use crate::source::ImageSource;
use crate::util::id::ConnectionId;
use crate::ws::protocol::ServerToClient;

pub type Outbox = mpsc::UnboundedReceiver<ServerToClient>;

pub struct Room {
    session: Mutex<GameSession>,
    observers: DashMap<ConnectionId, mpsc::UnboundedSender<ServerToClient>>,
    source: Arc<dyn ImageSource>,
    settings: Settings,
}

impl Room {
    pub fn new(source: Arc<dyn ImageSource>, settings: Settings) -> Arc<Self> {
        let session = GameSession::new(settings.lobby_config, settings.join_policy);
        Arc::new(Self {
            session: Mutex::new(session),
            observers: DashMap::new(),
            source,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register an observer. It is greeted with its handle and the current state.
    pub fn connect(&self, connection: ConnectionId) -> Outbox {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = self.session.lock();
        let _ = tx.send(ServerToClient::Welcome { connection: connection.clone() });
        let _ = tx.send(self.state_message(&session));
        self.observers.insert(connection.clone(), tx);
        info!(%connection, observers = self.observers.len(), "observer connected");
        rx
    }

    /// Stop relaying to `connection`. A seat it holds stays in the game.
    pub fn disconnect(&self, connection: &ConnectionId) {
        self.observers.remove(connection);
        debug!(%connection, "observer disconnected");
    }

    pub fn send_to(&self, connection: &ConnectionId, msg: ServerToClient) {
        if let Some(tx) = self.observers.get(connection) {
            let _ = tx.send(msg);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.lock().snapshot()
    }

    /// Fetch images and replace the session with a freshly dealt game.
    ///
    /// Nothing changes on failure.
    pub async fn start(&self, rows: u32, cols: u32, max_players: usize) -> Result<(), GameError> {
        let images = match self.source.fetch().await {
            Ok(images) => images,
            Err(err) => {
                warn!(%err, "image source unavailable, game not started");
                return Err(err.into());
            }
        };

        let config = GameConfig { rows, cols, max_players };
        let mut session = self.session.lock();
        let next = session.start(config, &images)?;
        *session = next;
        info!(generation = session.generation(), rows, cols, max_players, "game started");
        self.broadcast_state(&session);
        Ok(())
    }

    pub fn join(&self, connection: &ConnectionId, display_name: &str) {
        let mut session = self.session.lock();
        if !session.join(connection, display_name) {
            debug!(%connection, "join ignored");
            return;
        }
        info!(%connection, seats = session.players().len(), "player joined");
        self.broadcast_state(&session);
    }

    pub fn flip(self: &Arc<Self>, connection: &ConnectionId, coord: &str) {
        let mut session = self.session.lock();
        match session.reveal(connection, coord) {
            FlipReveal::Ignored => {
                debug!(%connection, coord, "flip ignored");
                return;
            }
            FlipReveal::First => {
                self.broadcast_state(&session);
                return;
            }
            FlipReveal::Pair => self.broadcast_state(&session),
        }

        match session.adjudicate() {
            Some(Verdict::Match { game_over }) => {
                self.broadcast_state(&session);
                if let Some(standings) = game_over {
                    info!(generation = session.generation(), "game over");
                    self.broadcast(&ServerToClient::GameOver { standings });
                }
            }
            Some(Verdict::Mismatch(ticket)) => self.schedule_hide(ticket),
            None => {}
        }
    }

    /// Return everyone to the lobby. Any reveal timer still running becomes stale.
    pub fn reset(&self) {
        let mut session = self.session.lock();
        let next = session.reset();
        *session = next;
        info!(generation = session.generation(), "game reset");
        self.broadcast(&ServerToClient::ReturnToMenu);
    }

    fn schedule_hide(self: &Arc<Self>, ticket: PendingHide) {
        let room = Arc::clone(self);
        let delay = self.settings.reveal_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            room.resolve_mismatch(ticket);
        });
    }

    fn resolve_mismatch(&self, ticket: PendingHide) {
        let mut session = self.session.lock();
        if !session.hide_mismatch(ticket) {
            debug!(
                ticket = ticket.generation,
                current = session.generation(),
                "stale reveal timer discarded"
            );
            return;
        }
        self.broadcast_state(&session);
    }

    fn state_message(&self, session: &GameSession) -> ServerToClient {
        match self.settings.snapshot_mode {
            SnapshotMode::Full => ServerToClient::GameUpdate { state: session.snapshot() },
            SnapshotMode::CardsOnly => ServerToClient::CardsUpdate { cards: session.cards().to_vec() },
        }
    }

    fn broadcast_state(&self, session: &GameSession) {
        self.broadcast(&self.state_message(session));
    }

    fn broadcast(&self, msg: &ServerToClient) {
        for entry in self.observers.iter() {
            let _ = entry.value().send(msg.clone());
        }
    }
}
