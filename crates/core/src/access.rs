//! Access policy: pure predicates over the caller and the target panorama.
//!
//! The `require_*` wrappers turn a failed predicate into
//! [`CoreError::Unauthorized`]. Callers must pass a freshly fetched
//! [`Panorama`], never a cached copy, so ownership decisions see the current
//! record.

use crate::error::CoreError;
use crate::identity::CallerIdentity;
use crate::panorama::Panorama;

/// True when the caller carries a user id.
pub fn is_authenticated(identity: &CallerIdentity) -> bool {
    identity.user_id.is_some()
}

pub fn is_admin(identity: &CallerIdentity) -> bool {
    identity.is_admin
}

/// True when the caller is an admin or the recorded owner.
///
/// Anonymous callers never own anything, including ownerless panoramas.
pub fn is_owner_or_admin(identity: &CallerIdentity, panorama: &Panorama) -> bool {
    if identity.is_admin {
        return true;
    }
    match (&identity.user_id, &panorama.owner_id) {
        (Some(caller), Some(owner)) => caller == owner,
        _ => false,
    }
}

/// Read access to a panorama's image: published, or owner, or admin.
pub fn can_view_image(identity: &CallerIdentity, panorama: &Panorama) -> bool {
    panorama.authorized || is_owner_or_admin(identity, panorama)
}

/// Returns the caller's user id when authenticated.
pub fn require_authenticated(identity: &CallerIdentity) -> Result<&str, CoreError> {
    identity.user_id.as_deref().ok_or_else(|| {
        CoreError::Unauthorized("Must be logged in to perform this operation.".into())
    })
}

pub fn require_admin(identity: &CallerIdentity) -> Result<(), CoreError> {
    if is_admin(identity) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(
            "Must be administrator to perform this operation.".into(),
        ))
    }
}

pub fn require_owner_or_admin(
    identity: &CallerIdentity,
    panorama: &Panorama,
) -> Result<(), CoreError> {
    if is_owner_or_admin(identity, panorama) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(
            "Not authorised to perform this operation.".into(),
        ))
    }
}

pub fn require_authorized_or_owner_or_admin(
    identity: &CallerIdentity,
    panorama: &Panorama,
) -> Result<(), CoreError> {
    if can_view_image(identity, panorama) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized("Panorama unauthorised".into()))
    }
}
