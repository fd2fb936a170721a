//! Deletion permissions
//!
//! Ownership is bearer-style: whoever presents the identity token that a
//! record was committed with owns the record. The token is an opaque value
//! carried in a long-lived cookie, not a signed credential; an operator
//! session bypasses the ownership check entirely.

use crate::models::FileRecord;

/// The identity a request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Identity token from the uploader cookie, absent when the client
    /// never uploaded (or cleared cookies).
    pub token: Option<String>,
    /// True for an authenticated operator session.
    pub privileged: bool,
}

impl Caller {
    pub fn anonymous(token: Option<String>) -> Self {
        Self {
            token,
            privileged: false,
        }
    }

    pub fn operator(token: Option<String>) -> Self {
        Self {
            token,
            privileged: true,
        }
    }

    /// Whether this caller uploaded `record`.
    pub fn owns(&self, record: &FileRecord) -> bool {
        self.token.as_deref() == Some(record.owner_token.as_str())
    }
}

/// Outcome of the deletion gate for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    Allowed,
    /// The record exists but belongs to a different identity. A distinct
    /// outcome, not an error; batch deletion reports and skips it.
    NotOwner,
}

/// Decide whether `caller` may delete `record`. Privileged callers may
/// delete anything; everyone else only what their own token committed.
pub fn can_delete(record: &FileRecord, caller: &Caller) -> DeleteDecision {
    if caller.privileged || caller.owns(record) {
        DeleteDecision::Allowed
    } else {
        DeleteDecision::NotOwner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::FileCategory;
    use chrono::Utc;
    use uuid::Uuid;

    fn record_owned_by(token: &str) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            original_filename: "photo.png".to_string(),
            category: FileCategory::Image,
            remote_path: "2025/09/23/photo.png".to_string(),
            thumbnail_path: Some("thumbnails/2025/09/23/photo.jpg".to_string()),
            created_at: Utc::now(),
            size_bytes: 1024,
            remark: None,
            owner_token: token.to_string(),
        }
    }

    #[test]
    fn operator_may_delete_anything() {
        let record = record_owned_by("abc123");
        let operator = Caller::operator(None);
        assert_eq!(can_delete(&record, &operator), DeleteDecision::Allowed);
    }

    #[test]
    fn owner_may_delete_own_record() {
        let record = record_owned_by("abc123");
        let owner = Caller::anonymous(Some("abc123".to_string()));
        assert_eq!(can_delete(&record, &owner), DeleteDecision::Allowed);
    }

    #[test]
    fn stranger_is_denied() {
        let record = record_owned_by("abc123");
        let stranger = Caller::anonymous(Some("zzz999".to_string()));
        assert_eq!(can_delete(&record, &stranger), DeleteDecision::NotOwner);
    }

    #[test]
    fn caller_without_token_is_denied() {
        let record = record_owned_by("abc123");
        let no_cookie = Caller::anonymous(None);
        assert_eq!(can_delete(&record, &no_cookie), DeleteDecision::NotOwner);
    }
}
