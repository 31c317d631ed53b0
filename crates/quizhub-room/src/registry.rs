//! Room registry: creates rooms, allocates codes, and tracks live rooms.

use std::collections::HashMap;
use std::sync::Arc;

use quizhub_bank::QuestionBank;
use quizhub_protocol::{ClientId, RoomCode, RoomSummary};
use rand::Rng;

use crate::actor::spawn_room;
use crate::{PacingConfig, RoomError, RoomHandle, RoomSession};

/// Characters room codes are sampled from.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate room codes.
///
/// The registry collision-checks candidates against live rooms, so a
/// generator only has to produce codes, not unique ones. Injectable so
/// tests can drive the collision path deterministically.
pub trait CodeGenerator: Send + Sync + 'static {
    fn generate(&mut self) -> RoomCode;
}

/// Samples fixed-length uppercase alphanumeric codes.
pub struct RandomCodes {
    len: usize,
}

impl RandomCodes {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new(6)
    }
}

impl CodeGenerator for RandomCodes {
    fn generate(&mut self) -> RoomCode {
        let mut rng = rand::rng();
        let code: String = (0..self.len)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        RoomCode::new(code)
    }
}

/// Registry tuning.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub pacing: PacingConfig,
    /// Collision retries before giving up on code allocation. With a
    /// 36^6 code space and small room counts, a handful of retries is
    /// already astronomically unlikely; the bound keeps the loop
    /// terminating even under a pathological generator.
    pub max_code_attempts: usize,
    /// Command channel size per room actor.
    pub channel_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            max_code_attempts: 32,
            channel_size: 64,
        }
    }
}

/// Owns the mapping of room code → room actor handle.
///
/// Explicitly constructed and injectable — tests get a fresh registry
/// each, nothing process-global. Callers serialize access behind one
/// lock at the gateway level, which is what keeps `sweep_empty` from
/// interleaving with an in-flight join.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    bank: Arc<QuestionBank>,
    codes: Box<dyn CodeGenerator>,
    config: RegistryConfig,
}

impl RoomRegistry {
    /// Creates a registry with random codes and default pacing.
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self::with_parts(bank, Box::new(RandomCodes::default()), RegistryConfig::default())
    }

    /// Creates a registry with an injected code generator and config.
    pub fn with_parts(
        bank: Arc<QuestionBank>,
        codes: Box<dyn CodeGenerator>,
        config: RegistryConfig,
    ) -> Self {
        Self { rooms: HashMap::new(), bank, codes, config }
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    /// Creates a room for `difficulty` and spawns its actor.
    pub fn create_room(
        &mut self,
        host: ClientId,
        difficulty: &str,
        title: Option<String>,
    ) -> Result<(RoomCode, RoomSummary), RoomError> {
        let quiz = self
            .bank
            .get(difficulty)
            .ok_or_else(|| RoomError::UnknownDifficulty(difficulty.to_string()))?
            .clone();

        let code = self.allocate_code()?;
        let session = RoomSession::new(code.clone(), host, Arc::new(quiz), title);
        let summary = session.summary();

        let handle = spawn_room(session, self.config.pacing.clone(), self.config.channel_size);
        self.rooms.insert(code.clone(), handle);

        tracing::info!(room = %code, host = %host, difficulty, "room created");
        Ok((code, summary))
    }

    /// The handle for a live room, if any.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    /// Public metadata for a live room.
    pub async fn summary(&self, code: &RoomCode) -> Result<RoomSummary, RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        handle.summary().await
    }

    /// Deletes a room, shutting its actor down. Idempotent: returns
    /// whether a room existed.
    pub async fn delete(&mut self, code: &RoomCode) -> bool {
        let Some(handle) = self.rooms.remove(code) else {
            return false;
        };
        let _ = handle.shutdown().await;
        tracing::info!(room = %code, "room deleted");
        true
    }

    /// Deletes every room whose participant set is currently empty.
    ///
    /// Runs on a periodic external trigger, not from the hot path — a
    /// room is deliberately *not* destroyed the moment its last
    /// participant leaves, so a host mid-reconnect keeps their room.
    pub async fn sweep_empty(&mut self) -> usize {
        let mut empty = Vec::new();
        for (code, handle) in &self.rooms {
            match handle.summary().await {
                Ok(summary) if summary.participant_count == 0 => empty.push(code.clone()),
                // Unresponsive actors are collected too — their channel
                // is gone, so the room can never be used again.
                Err(_) => empty.push(code.clone()),
                Ok(_) => {}
            }
        }

        for code in &empty {
            self.delete(code).await;
        }

        if !empty.is_empty() {
            tracing::info!(count = empty.len(), "swept empty rooms");
        }
        empty.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }

    /// Samples codes until one misses the live set, up to the configured
    /// retry bound.
    fn allocate_code(&mut self) -> Result<RoomCode, RoomError> {
        for _ in 0..self.config.max_code_attempts {
            let code = self.codes.generate();
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(RoomError::CodeSpaceExhausted)
    }
}
