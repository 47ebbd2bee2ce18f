//! User and team roster records.

use serde::Deserialize;

/// A user as returned by `GET /accounts/users/{id}/` and `GET /accounts/me/`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// An entry of the manager's team roster. Only the id is relied upon.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TeamMember {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Whether `user_id` appears in the roster, by exact id match.
pub fn is_team_member(roster: &[TeamMember], user_id: u64) -> bool {
    roster.iter().any(|m| m.id == user_id)
}

/// Coerce a textual route parameter to a numeric user id.
pub fn parse_user_id(param: &str) -> Option<u64> {
    param.trim().parse().ok()
}

/// Capitalise a role for display, e.g. `developer` → `Developer`.
pub fn display_role(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_exact_id_match() {
        let roster: Vec<TeamMember> =
            serde_json::from_str(r#"[{"id": 4, "username": "ana"}, {"id": 42}]"#).unwrap();
        assert!(is_team_member(&roster, 42));
        assert!(!is_team_member(&roster, 420));
        assert!(!is_team_member(&[], 42));
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("42"), Some(42));
        assert_eq!(parse_user_id("abc"), None);
        assert_eq!(parse_user_id("-1"), None);
    }

    #[test]
    fn test_display_role() {
        assert_eq!(display_role("developer"), "Developer");
        assert_eq!(display_role(""), "");
    }
}
