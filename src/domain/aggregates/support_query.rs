//! Support Query Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{SupportQueryId, UserId};

/// Customer support ticket. Immutable once raised.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportQuery {
    pub id: SupportQueryId,
    pub user: UserId,
    pub subject: String,
    pub describe_subject: String,
    pub created_at: DateTime<Utc>,
}

impl SupportQuery {
    pub fn raise(user: UserId, subject: Option<String>, describe_subject: Option<String>) -> Result<Self, SupportQueryError> {
        let subject = subject.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let describe_subject = describe_subject.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        match (subject, describe_subject) {
            (Some(subject), Some(describe_subject)) => Ok(Self {
                id: SupportQueryId::new(), user, subject, describe_subject, created_at: Utc::now(),
            }),
            _ => Err(SupportQueryError::MissingFields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SupportQueryError {
    #[error("Subject and description are required")]
    MissingFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_requires_both_fields() {
        let user = UserId::new();
        assert!(SupportQuery::raise(user, Some("Late delivery".into()), Some("Order is a week late".into())).is_ok());
        assert_eq!(SupportQuery::raise(user, Some("Late".into()), None), Err(SupportQueryError::MissingFields));
        assert_eq!(SupportQuery::raise(user, Some("  ".into()), Some("x".into())), Err(SupportQueryError::MissingFields));
    }
}
