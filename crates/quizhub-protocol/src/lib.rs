//! Wire protocol for Quizhub.
//!
//! Everything that travels between a client and the coordinator lives
//! here: identity newtypes, the inbound/outbound event enums, the
//! answer-stripped content views, and the codec that turns them into
//! text frames.
//!
//! The rule this crate enforces at the type level: **no outbound question
//! payload ever carries the correct answer or the explanation**. Clients
//! only see [`QuestionView`]/[`QuizView`], which do not have those fields;
//! the lone exception is the `answer-result` event, unicast to the
//! participant who just answered.

mod codec;
mod error;
mod events;
mod ids;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{
    CatalogEntry, ClientEvent, GameState, LeaderboardEntry, ParticipantView, QuestionView,
    QuizView, RoomSummary, ServerEvent, SettingsView,
};
pub use ids::{ClientId, RoomCode};
