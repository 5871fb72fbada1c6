//! The turn-based flip/match state machine.
//!
//! A `GameSession` is never patched from the outside: `start` and `reset` hand back a whole new
//! session carrying the next generation. Timed work scheduled against one generation is
//! discarded by any later generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::deck::{self, Card, SourceImage};
use crate::error::GameError;
use crate::game::{GameConfig, JoinPolicy, Phase, Player, Standing};
use crate::util::id::ConnectionId;

/// Result of turning one card face up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipReveal {
    /// A precondition did not hold; nothing changed.
    Ignored,
    /// First card of the turn is up.
    First,
    /// Second card is up; call [`GameSession::adjudicate`].
    Pair,
}

/// Ticket for hiding a mismatched pair once the reveal window is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingHide {
    pub generation: u64,
    first: usize,
    second: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Pair matched. The same player keeps the turn. `game_over` is set when it was the last pair.
    Match { game_over: Option<Vec<Standing>> },
    Mismatch(PendingHide),
}

/// Observable state, sent to every observer after each change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub generation: u64,
    pub phase: Phase,
    pub cards: Vec<Card>,
    pub players: Vec<Player>,
    pub current_player_index: usize,
    /// Coordinates of the face-up cards awaiting adjudication.
    pub pending_reveal: Vec<String>,
    pub can_accept_flip: bool,
    pub started: bool,
    pub config: GameConfig,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    generation: u64,
    config: GameConfig,
    join_policy: JoinPolicy,
    cards: Vec<Card>,
    players: Vec<Player>,
    current_player: usize,
    pending: Vec<usize>,
    can_accept_flip: bool,
    started: bool,
    /// Set once any card of this game has been turned, even if it was hidden again.
    flipped_any: bool,
}

impl GameSession {
    /// Empty lobby with no board, generation 0.
    pub fn new(config: GameConfig, join_policy: JoinPolicy) -> Self {
        Self {
            generation: 0,
            config,
            join_policy,
            cards: Vec::new(),
            players: Vec::new(),
            current_player: 0,
            pending: Vec::new(),
            can_accept_flip: false,
            started: false,
            flipped_any: false,
        }
    }

    /// Build the session that replaces this one when a game starts.
    pub fn start(&self, config: GameConfig, images: &[SourceImage]) -> Result<GameSession, GameError> {
        self.start_with_rng(config, images, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(
        &self,
        config: GameConfig,
        images: &[SourceImage],
        rng: &mut R,
    ) -> Result<GameSession, GameError> {
        if config.max_players == 0 {
            return Err(GameError::board("at least one player seat is required"));
        }
        let cards = deck::build_with_rng(config.rows, config.cols, images, rng)?;
        Ok(GameSession {
            generation: self.generation + 1,
            config,
            join_policy: self.join_policy,
            cards,
            players: Vec::new(),
            current_player: 0,
            pending: Vec::new(),
            can_accept_flip: true,
            started: true,
            flipped_any: false,
        })
    }

    /// Session that replaces this one on reset: back in the lobby on the same board.
    ///
    /// Unmatched cards left face up by an interrupted turn are turned back down.
    pub fn reset(&self) -> GameSession {
        let cards = self
            .cards
            .iter()
            .cloned()
            .map(|mut card| {
                if !card.is_matched {
                    card.is_flipped = false;
                }
                card
            })
            .collect();
        GameSession {
            generation: self.generation + 1,
            config: self.config,
            join_policy: self.join_policy,
            cards,
            players: Vec::new(),
            current_player: 0,
            pending: Vec::new(),
            can_accept_flip: false,
            started: false,
            flipped_any: false,
        }
    }

    /// Seat `connection` if there is room. Returns false when the request was ignored.
    pub fn join(&mut self, connection: &ConnectionId, display_name: &str) -> bool {
        if self.players.len() >= self.config.max_players {
            return false;
        }
        if self.players.iter().any(|p| &p.connection == connection) {
            return false;
        }
        if self.join_policy == JoinPolicy::BeforeFirstFlip && self.flipped_any {
            return false;
        }
        let display_name = match display_name.trim() {
            "" => format!("Player {}", self.players.len() + 1),
            name => name.to_string(),
        };
        self.players.push(Player { connection: connection.clone(), display_name, score: 0 });
        true
    }

    /// Capability check: does `connection` own the seat whose turn it is.
    pub fn holds_turn(&self, connection: &ConnectionId) -> bool {
        self.players
            .get(self.current_player)
            .is_some_and(|p| &p.connection == connection)
    }

    /// Turn the card at `coord` face up on behalf of `connection`.
    pub fn reveal(&mut self, connection: &ConnectionId, coord: &str) -> FlipReveal {
        if !self.started || !self.can_accept_flip || !self.holds_turn(connection) {
            return FlipReveal::Ignored;
        }
        let Some(index) = self.cards.iter().position(|c| c.coord == coord) else {
            return FlipReveal::Ignored;
        };
        if !self.cards[index].is_hidden() {
            return FlipReveal::Ignored;
        }

        self.cards[index].is_flipped = true;
        self.flipped_any = true;
        self.pending.push(index);
        if self.pending.len() == 2 {
            self.can_accept_flip = false;
            FlipReveal::Pair
        } else {
            FlipReveal::First
        }
    }

    /// Decide the two pending cards. `None` unless exactly two are pending.
    pub fn adjudicate(&mut self) -> Option<Verdict> {
        let &[first, second] = self.pending.as_slice() else {
            return None;
        };
        if !self.cards[first].pairs_with(&self.cards[second]) {
            return Some(Verdict::Mismatch(PendingHide { generation: self.generation, first, second }));
        }

        self.cards[first].is_matched = true;
        self.cards[second].is_matched = true;
        if let Some(player) = self.players.get_mut(self.current_player) {
            player.score += 1;
        }
        self.pending.clear();
        self.can_accept_flip = true;

        let game_over = self.is_complete().then(|| self.standings());
        Some(Verdict::Match { game_over })
    }

    /// Close the reveal window of a mismatch: hide both cards and pass the turn.
    ///
    /// Returns false, changing nothing, if the ticket belongs to an older generation or the
    /// pending pair is no longer the one it was issued for.
    pub fn hide_mismatch(&mut self, ticket: PendingHide) -> bool {
        if ticket.generation != self.generation || self.pending[..] != [ticket.first, ticket.second] {
            return false;
        }
        for index in [ticket.first, ticket.second] {
            self.cards[index].is_flipped = false;
        }
        self.pending.clear();
        if !self.players.is_empty() {
            self.current_player = (self.current_player + 1) % self.players.len();
        }
        self.can_accept_flip = true;
        true
    }

    pub fn phase(&self) -> Phase {
        if !self.started {
            Phase::Lobby
        } else if self.is_complete() {
            Phase::Complete
        } else if !self.can_accept_flip {
            Phase::Resolving
        } else {
            Phase::Active
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.is_matched)
    }

    /// Scores in join order.
    pub fn standings(&self) -> Vec<Standing> {
        self.players
            .iter()
            .map(|p| Standing { display_name: p.display_name.clone(), score: p.score })
            .collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player
    }

    pub fn pending_reveal(&self) -> Vec<&Card> {
        self.pending.iter().map(|&i| &self.cards[i]).collect()
    }

    pub fn can_accept_flip(&self) -> bool {
        self.can_accept_flip
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            phase: self.phase(),
            cards: self.cards.clone(),
            players: self.players.clone(),
            current_player_index: self.current_player,
            pending_reveal: self.pending.iter().map(|&i| self.cards[i].coord.clone()).collect(),
            can_accept_flip: self.can_accept_flip,
            started: self.started,
            config: self.config,
        }
    }
}
