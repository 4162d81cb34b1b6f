//! Redirect rule entity and its HTTP status semantics.

use chrono::{DateTime, Utc};
use std::fmt;

/// The HTTP behaviour attached to a redirect rule.
///
/// The discriminants are the status codes sent to the client and the values
/// stored in the `redirect_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RedirectKind {
    MovedPermanently = 301,
    Found = 302,
    TemporaryRedirect = 307,
    PermanentRedirect = 308,
    Gone = 410,
    UnavailableForLegalReasons = 451,
}

impl RedirectKind {
    /// All supported kinds, in status-code order.
    pub const ALL: [RedirectKind; 6] = [
        Self::MovedPermanently,
        Self::Found,
        Self::TemporaryRedirect,
        Self::PermanentRedirect,
        Self::Gone,
        Self::UnavailableForLegalReasons,
    ];

    /// Returns the numeric HTTP status code.
    pub fn status_code(self) -> u16 {
        self as u16
    }

    /// Returns `true` for kinds that send a `Location` header.
    pub fn is_redirect(self) -> bool {
        matches!(
            self,
            Self::MovedPermanently | Self::Found | Self::TemporaryRedirect | Self::PermanentRedirect
        )
    }
}

impl TryFrom<u16> for RedirectKind {
    type Error = u16;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.status_code() == code)
            .ok_or(code)
    }
}

impl TryFrom<i16> for RedirectKind {
    type Error = i16;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        u16::try_from(code)
            .ok()
            .and_then(|c| Self::try_from(c).ok())
            .ok_or(code)
    }
}

impl fmt::Display for RedirectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// A stored mapping from a source path to a destination.
///
/// `source` is kept in canonical form (single leading slash); trailing-slash
/// variants are generated at lookup time. `destination` is empty for
/// [`RedirectKind::Gone`] and [`RedirectKind::UnavailableForLegalReasons`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub id: i64,
    pub source: String,
    pub destination: String,
    pub kind: RedirectKind,
    pub is_active: bool,
    pub hits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RedirectRule {
    /// Creates a new RedirectRule instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        source: String,
        destination: String,
        kind: RedirectKind,
        is_active: bool,
        hits: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            kind,
            is_active,
            hits,
            created_at,
            updated_at,
        }
    }
}

/// Input data for creating a new rule. Values are already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedirect {
    pub source: String,
    pub destination: String,
    pub kind: RedirectKind,
    pub is_active: bool,
}

/// Partial update for an existing rule.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectPatch {
    pub destination: Option<String>,
    pub kind: Option<RedirectKind>,
    pub is_active: Option<bool>,
}

impl RedirectPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.destination.is_none() && self.kind.is_none() && self.is_active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_status_code() {
        assert_eq!(RedirectKind::try_from(301u16), Ok(RedirectKind::MovedPermanently));
        assert_eq!(RedirectKind::try_from(308u16), Ok(RedirectKind::PermanentRedirect));
        assert_eq!(RedirectKind::try_from(451u16), Ok(RedirectKind::UnavailableForLegalReasons));
        assert_eq!(RedirectKind::try_from(200u16), Err(200));
        assert_eq!(RedirectKind::try_from(303u16), Err(303));
    }

    #[test]
    fn test_kind_from_stored_smallint() {
        assert_eq!(RedirectKind::try_from(410i16), Ok(RedirectKind::Gone));
        assert_eq!(RedirectKind::try_from(-1i16), Err(-1));
    }

    #[test]
    fn test_kind_is_redirect() {
        assert!(RedirectKind::MovedPermanently.is_redirect());
        assert!(RedirectKind::TemporaryRedirect.is_redirect());
        assert!(!RedirectKind::Gone.is_redirect());
        assert!(!RedirectKind::UnavailableForLegalReasons.is_redirect());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RedirectKind::Found.to_string(), "302");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(RedirectPatch::default().is_empty());
        let patch = RedirectPatch {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
