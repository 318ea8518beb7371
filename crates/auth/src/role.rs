use super::*;

/// Role tag restricting access to privileged operations.
///
/// The set is closed at compile time; every account carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// The single policy decision point for role gating: exact match,
    /// no hierarchy. Every privileged route names its required role.
    pub fn permits(self, required: Role) -> bool {
        self == required
    }
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(AuthError::UnknownRole),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_is_exact_match() {
        assert!(Role::Admin.permits(Role::Admin));
        assert!(Role::User.permits(Role::User));
        assert!(!Role::User.permits(Role::Admin));
        // no hierarchy: admin does not implicitly satisfy user-gated routes
        assert!(!Role::Admin.permits(Role::User));
    }

    #[test]
    fn tags_round_trip() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
