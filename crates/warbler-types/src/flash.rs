/// Cookie that carries a one-shot notice across a redirect.
pub const FLASH_COOKIE: &str = "flash";

/// Flash codes rendered by the home page after a redirect.
///
/// Every rejected access, whether the caller has no session or is acting on
/// someone else's resource, maps to [`Flash::AccessUnauthorized`] so clients
/// see a single wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    AccessUnauthorized,
    LoggedOut,
    AccountDeleted,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Self::AccessUnauthorized => "access_unauthorized",
            Self::LoggedOut => "logged_out",
            Self::AccountDeleted => "account_deleted",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::AccessUnauthorized => "Access unauthorized.",
            Self::LoggedOut => "You have been logged out.",
            Self::AccountDeleted => "Your account has been deleted.",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "access_unauthorized" => Some(Self::AccessUnauthorized),
            "logged_out" => Some(Self::LoggedOut),
            "account_deleted" => Some(Self::AccountDeleted),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_resolve_back() {
        for flash in [Flash::AccessUnauthorized, Flash::LoggedOut, Flash::AccountDeleted] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("bogus"), None);
    }
}
