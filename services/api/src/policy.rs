//! Authorization policy
//!
//! Pure decision tables keyed by (actor role, operation, target). Handlers
//! call these before touching the store; everything here is synchronous and
//! side-effect free so the whole policy is unit-testable in isolation.

use thiserror::Error;

use crate::error::ApiError;
use crate::models::user::{Role, UserPatch};

/// A policy denial with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PolicyDenial(String);

impl PolicyDenial {
    fn new(reason: impl Into<String>) -> Self {
        PolicyDenial(reason.into())
    }
}

impl From<PolicyDenial> for ApiError {
    fn from(denial: PolicyDenial) -> Self {
        ApiError::Forbidden(denial.0)
    }
}

/// Gate for operations restricted to admin and superadmin
pub fn require_admin(actor: Role) -> Result<(), PolicyDenial> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(PolicyDenial::new("Administrator privileges required"))
    }
}

/// Gate for operations restricted to superadmin
pub fn require_superadmin(actor: Role) -> Result<(), PolicyDenial> {
    if actor == Role::Superadmin {
        Ok(())
    } else {
        Err(PolicyDenial::new("Superadmin privileges required"))
    }
}

/// Fields a user patch may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchField {
    Username,
    Email,
    Password,
    Role,
    Status,
}

impl PatchField {
    fn name(&self) -> &'static str {
        match self {
            PatchField::Username => "username",
            PatchField::Email => "email",
            PatchField::Password => "password",
            PatchField::Role => "role",
            PatchField::Status => "status",
        }
    }
}

const ALL_FIELDS: &[PatchField] = &[
    PatchField::Username,
    PatchField::Email,
    PatchField::Password,
    PatchField::Role,
    PatchField::Status,
];

const SELF_SERVICE_FIELDS: &[PatchField] = &[PatchField::Password];

/// The role -> allowed-fields table for user updates
fn allowed_fields(actor: Role, is_self: bool) -> &'static [PatchField] {
    match actor {
        Role::Superadmin | Role::Admin => ALL_FIELDS,
        Role::User if is_self => SELF_SERVICE_FIELDS,
        Role::User => &[],
    }
}

fn touched_fields(patch: &UserPatch) -> Vec<PatchField> {
    let mut fields = Vec::new();
    if patch.username.is_some() {
        fields.push(PatchField::Username);
    }
    if patch.email.is_some() {
        fields.push(PatchField::Email);
    }
    if patch.password.is_some() {
        fields.push(PatchField::Password);
    }
    if patch.role.is_some() {
        fields.push(PatchField::Role);
    }
    if patch.status.is_some() {
        fields.push(PatchField::Status);
    }
    fields
}

/// Authorize a partial user update
///
/// - superadmin may set any field on any target, including role changes in
///   either direction;
/// - admin may do the same except against a superadmin target, and may
///   never grant the superadmin role;
/// - a plain user may only change their own password, and must present the
///   current password alongside it.
pub fn authorize_user_patch(
    actor: Role,
    is_self: bool,
    target: Role,
    patch: &UserPatch,
) -> Result<(), PolicyDenial> {
    let allowed = allowed_fields(actor, is_self);

    for field in touched_fields(patch) {
        if !allowed.contains(&field) {
            return Err(PolicyDenial::new(format!(
                "Your role may not change the {} field",
                field.name()
            )));
        }
    }

    match actor {
        Role::Superadmin => Ok(()),
        Role::Admin => {
            if target == Role::Superadmin {
                return Err(PolicyDenial::new(
                    "Administrators may not modify a superadmin account",
                ));
            }
            if patch.role == Some(Role::Superadmin) {
                return Err(PolicyDenial::new(
                    "Only a superadmin can grant the superadmin role",
                ));
            }
            Ok(())
        }
        Role::User => {
            // allowed_fields already restricted this to own-password changes
            if patch.password.is_some() && patch.old_password.is_none() {
                return Err(PolicyDenial::new(
                    "Changing your password requires the current password",
                ));
            }
            Ok(())
        }
    }
}

/// Authorize deactivating a user account
pub fn authorize_deactivation(actor: Role, target: Role) -> Result<(), PolicyDenial> {
    require_admin(actor)?;

    if actor == Role::Admin && target == Role::Superadmin {
        return Err(PolicyDenial::new(
            "Administrators may not deactivate a superadmin account",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserStatus;

    fn patch_with_role(role: Role) -> UserPatch {
        UserPatch {
            role: Some(role),
            ..Default::default()
        }
    }

    #[test]
    fn admin_gate_rejects_plain_users() {
        assert!(require_admin(Role::User).is_err());
        assert!(require_admin(Role::Admin).is_ok());
        assert!(require_admin(Role::Superadmin).is_ok());
    }

    #[test]
    fn superadmin_gate_rejects_admins() {
        assert!(require_superadmin(Role::Admin).is_err());
        assert!(require_superadmin(Role::Superadmin).is_ok());
    }

    #[test]
    fn admin_cannot_grant_superadmin_role() {
        let patch = patch_with_role(Role::Superadmin);
        assert!(authorize_user_patch(Role::Admin, false, Role::User, &patch).is_err());
        assert!(authorize_user_patch(Role::Superadmin, false, Role::User, &patch).is_ok());
    }

    #[test]
    fn admin_cannot_touch_superadmin_target() {
        let patch = UserPatch {
            status: Some(UserStatus::Inactive),
            ..Default::default()
        };
        assert!(authorize_user_patch(Role::Admin, false, Role::Superadmin, &patch).is_err());
        assert!(authorize_user_patch(Role::Superadmin, false, Role::Superadmin, &patch).is_ok());
    }

    #[test]
    fn admin_may_demote_and_promote_below_superadmin() {
        assert!(
            authorize_user_patch(Role::Admin, false, Role::User, &patch_with_role(Role::Admin))
                .is_ok()
        );
        assert!(
            authorize_user_patch(Role::Admin, false, Role::Admin, &patch_with_role(Role::User))
                .is_ok()
        );
    }

    #[test]
    fn user_may_only_change_own_password() {
        let password_patch = UserPatch {
            password: Some("N3w-password!".into()),
            old_password: Some("old".into()),
            ..Default::default()
        };
        assert!(authorize_user_patch(Role::User, true, Role::User, &password_patch).is_ok());
        // not their own account
        assert!(authorize_user_patch(Role::User, false, Role::User, &password_patch).is_err());

        // any other field is off limits even on their own account
        let email_patch = UserPatch {
            email: Some("new@example.com".into()),
            ..Default::default()
        };
        assert!(authorize_user_patch(Role::User, true, Role::User, &email_patch).is_err());
    }

    #[test]
    fn self_service_password_change_requires_proof() {
        let patch = UserPatch {
            password: Some("N3w-password!".into()),
            ..Default::default()
        };
        assert!(authorize_user_patch(Role::User, true, Role::User, &patch).is_err());
    }

    #[test]
    fn deactivation_follows_role_ladder() {
        assert!(authorize_deactivation(Role::User, Role::User).is_err());
        assert!(authorize_deactivation(Role::Admin, Role::User).is_ok());
        assert!(authorize_deactivation(Role::Admin, Role::Superadmin).is_err());
        assert!(authorize_deactivation(Role::Superadmin, Role::Superadmin).is_ok());
    }
}
