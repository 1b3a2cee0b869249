mod guest;
mod ids;
mod score;
mod session;

pub use guest::{
    GUEST_SESSION_KEY, GuestDraft, GuestSessionData, GuestSessionError, SessionIdentifier,
};
pub use ids::{ExamId, ParseIdError, SessionId, StudentId};
pub use score::{ScoreRecord, ScoreSummary};
pub use session::{SessionKind, SessionStatus, SessionStatusError, TimedSession};
