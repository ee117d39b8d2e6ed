use serde::{Deserialize, Serialize};

/// Access level of the acting user.
///
/// The backend's transition and delete functions enforce role rules
/// server-side; the client never pre-judges them, it just sends the role
/// along and relays verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Office,
    Field,
}

impl Role {
    /// Convert to string for headers and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Office => "office",
            Role::Field => "field",
        }
    }

    /// Parse from string (config, environment)
    pub fn from_str(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "office" => Some(Role::Office),
            "field" => Some(Role::Field),
            _ => None,
        }
    }
}

/// Who is acting, and for which tenant.
///
/// Built once from configuration and passed explicitly into every backend
/// call; nothing in the crate reads tenant or user from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub tenant_id: String,
    pub user_id: String,
    pub role: Role,
}

impl RequestContext {
    pub fn new(tenant_id: &str, user_id: &str, role: Role) -> Self {
        RequestContext {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Office.as_str(), "office");
        assert_eq!(Role::Field.as_str(), "field");
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("office"), Some(Role::Office));
        assert_eq!(Role::from_str("field"), Some(Role::Field));
        assert_eq!(Role::from_str("manager"), None);
        assert_eq!(Role::from_str("Admin"), None);
    }

    #[test]
    fn test_context_new() {
        let ctx = RequestContext::new("t-acme", "u-9", Role::Office);
        assert_eq!(ctx.tenant_id, "t-acme");
        assert_eq!(ctx.user_id, "u-9");
        assert_eq!(ctx.role, Role::Office);
    }
}
