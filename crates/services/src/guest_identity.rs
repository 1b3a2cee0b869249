use std::sync::Arc;

use quizya_core::model::{
    ExamId, GUEST_SESSION_KEY, GuestDraft, GuestSessionData, SessionId, SessionIdentifier,
};
use storage::kv::KeyValueStore;

use crate::error::GuestIdentityError;

/// Resolves whether the current client is an anonymous guest exam-taker.
///
/// Reads fail closed: missing, malformed or non-guest records and storage
/// failures all resolve to "no guest session". Hosts without client storage
/// pass an `UnavailableStore`.
#[derive(Clone)]
pub struct GuestIdentityService {
    store: Arc<dyn KeyValueStore>,
}

impl GuestIdentityService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored guest record, if a valid one exists.
    #[must_use]
    pub fn get_guest_session(&self) -> Option<GuestSessionData> {
        if !self.store.is_available() {
            return None;
        }

        let raw = match self.store.get(GUEST_SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "guest storage unreadable");
                return None;
            }
        };

        let data = GuestSessionData::from_json(&raw);
        if data.is_none() {
            tracing::warn!("ignoring malformed guest record");
        }
        data
    }

    /// Remove the stored guest record. Idempotent and infallible.
    pub fn clear_guest_session(&self) {
        if !self.store.is_available() {
            return;
        }
        if let Err(err) = self.store.remove(GUEST_SESSION_KEY) {
            tracing::warn!(error = %err, "failed to clear guest record");
        }
    }

    #[must_use]
    pub fn is_guest_session(&self) -> bool {
        self.get_guest_session().is_some()
    }

    /// Identifier used to attribute a submission.
    ///
    /// Only the guest branch is resolved here; authenticated students are
    /// identified by the auth provider.
    #[must_use]
    pub fn session_identifier(&self) -> SessionIdentifier {
        self.get_guest_session()
            .map(|data| SessionIdentifier::guest(data.guest_email))
            .unwrap_or_default()
    }

    /// Validate guest details and store a fresh guest record for `exam_id`.
    ///
    /// # Errors
    ///
    /// Returns `GuestIdentityError` if validation fails or the store rejects
    /// the write.
    pub fn start_guest_session(
        &self,
        exam_id: ExamId,
        draft: GuestDraft,
    ) -> Result<GuestSessionData, GuestIdentityError> {
        let data = draft.validate(SessionId::generate(), exam_id)?;
        self.store.set(GUEST_SESSION_KEY, &data.to_json()?)?;
        tracing::info!(exam_id = %exam_id, session_id = %data.session_id, "guest session started");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::kv::{MemoryStore, UnavailableStore};
    use storage::repository::StorageError;

    const SAMPLE: &str = r#"{"sessionId":"s1","examId":"e1","guestName":"Jo","guestEmail":"jo@x.com","isGuest":true}"#;

    fn service_with(raw: Option<&str>) -> GuestIdentityService {
        let store = MemoryStore::new();
        if let Some(raw) = raw {
            store.set(GUEST_SESSION_KEY, raw).unwrap();
        }
        GuestIdentityService::new(Arc::new(store))
    }

    /// Store that errors on every access.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("denied".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("denied".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("denied".into()))
        }
    }

    #[test]
    fn absent_invalid_or_non_guest_is_none() {
        assert_eq!(service_with(None).get_guest_session(), None);
        assert_eq!(service_with(Some("not json")).get_guest_session(), None);

        let not_guest = SAMPLE.replace("true", "false");
        assert_eq!(service_with(Some(&not_guest)).get_guest_session(), None);
    }

    #[test]
    fn returns_stored_record() {
        let svc = service_with(Some(SAMPLE));
        let data = svc.get_guest_session().unwrap();
        assert_eq!(data.session_id, "s1");
        assert_eq!(data.guest_email, "jo@x.com");
        assert!(svc.is_guest_session());
        assert_eq!(svc.session_identifier(), SessionIdentifier::guest("jo@x.com"));
    }

    #[test]
    fn clear_is_idempotent() {
        let svc = service_with(Some(SAMPLE));
        svc.clear_guest_session();
        svc.clear_guest_session();
        assert_eq!(svc.get_guest_session(), None);
        assert!(svc.session_identifier().is_empty());
    }

    #[test]
    fn unavailable_store_behaves_as_no_guest() {
        let svc = GuestIdentityService::new(Arc::new(UnavailableStore));
        assert_eq!(svc.get_guest_session(), None);
        assert!(!svc.is_guest_session());
        svc.clear_guest_session();
        assert_eq!(svc.session_identifier(), SessionIdentifier::default());
    }

    #[test]
    fn storage_failures_fail_closed() {
        let svc = GuestIdentityService::new(Arc::new(BrokenStore));
        assert_eq!(svc.get_guest_session(), None);
        svc.clear_guest_session();
        assert!(matches!(
            svc.start_guest_session(ExamId::generate(), GuestDraft::new("Jo", "jo@x.com")),
            Err(GuestIdentityError::Storage(_))
        ));
    }
}
