//! Role and ownership checks shared by every route

use flow_core::employee::{AccessLevel, Employee};

use super::AuthError;

/// The identity a request acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Authorization is disabled; every operation is allowed
    Unrestricted,
    Employee { id: i64, access_level: AccessLevel },
}

impl Caller {
    pub fn from_employee(employee: &Employee) -> Self {
        Self::Employee {
            id: employee.id,
            access_level: employee.access_level,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Employee { access_level, .. } => access_level.is_admin(),
        }
    }

    /// The caller's own employee id, if it is a restricted employee
    pub fn restricted_to(&self) -> Option<i64> {
        match self {
            Self::Employee { id, .. } if !self.is_admin() => Some(*id),
            _ => None,
        }
    }
}

/// Allow admins everything; otherwise require `required` below admin and
/// ownership of the resource.
pub fn ensure_access(
    caller: &Caller,
    owner_id: Option<i64>,
    required: AccessLevel,
) -> Result<(), AuthError> {
    if caller.is_admin() {
        return Ok(());
    }
    if required.is_admin() {
        return Err(AuthError::Forbidden("admin access required".to_string()));
    }
    match (caller.restricted_to(), owner_id) {
        (Some(caller_id), Some(owner_id)) if caller_id == owner_id => Ok(()),
        _ => Err(AuthError::Forbidden(
            "resource belongs to another employee".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Caller = Caller::Employee {
        id: 1,
        access_level: AccessLevel::Admin,
    };
    const USER: Caller = Caller::Employee {
        id: 2,
        access_level: AccessLevel::User,
    };

    #[test]
    fn admins_and_open_mode_pass_everything() {
        for caller in [ADMIN, Caller::Unrestricted] {
            assert!(ensure_access(&caller, None, AccessLevel::Admin).is_ok());
            assert!(ensure_access(&caller, Some(99), AccessLevel::User).is_ok());
            assert!(ensure_access(&caller, None, AccessLevel::User).is_ok());
        }
    }

    #[test]
    fn users_only_reach_their_own_resources() {
        assert!(ensure_access(&USER, Some(2), AccessLevel::User).is_ok());
        assert!(matches!(
            ensure_access(&USER, Some(3), AccessLevel::User),
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_access(&USER, None, AccessLevel::User),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn users_never_pass_admin_checks() {
        assert!(matches!(
            ensure_access(&USER, Some(2), AccessLevel::Admin),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn restriction_only_applies_to_non_admins() {
        assert_eq!(USER.restricted_to(), Some(2));
        assert_eq!(ADMIN.restricted_to(), None);
        assert_eq!(Caller::Unrestricted.restricted_to(), None);
    }
}
