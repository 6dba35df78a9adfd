use serde::{Deserialize, Serialize};

/// Who can reach a document through its link.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum LinkReach {
    #[default]
    Restricted,
    Authenticated,
    Public,
}

/// Role granted by the document link.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LinkRole {
    #[default]
    Reader,
    Editor,
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Role {
    #[default]
    Reader,
    Editor,
    Administrator,
    Owner,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Reader, Role::Editor, Role::Administrator, Role::Owner];

    pub fn label(self) -> &'static str {
        match self {
            Role::Reader => "Reader",
            Role::Editor => "Editor",
            Role::Administrator => "Administrator",
            Role::Owner => "Owner",
        }
    }

    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Administrator | Role::Owner)
    }
}

/// Capabilities of the current viewer on a document, computed by the backend.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct DocAbilities {
    pub accesses_manage: bool,
    pub accesses_view: bool,
    pub destroy: bool,
    pub link_configuration: bool,
    pub invite_owner: bool,
    pub partial_update: bool,
    pub retrieve: bool,
    pub update: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Doc {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link_reach: LinkReach,
    #[serde(default)]
    pub link_role: LinkRole,
    #[serde(default)]
    pub abilities: DocAbilities,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub nb_accesses: u32,
}

impl Doc {
    pub fn is_public(&self) -> bool {
        self.link_reach == LinkReach::Public
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled document"
        } else {
            &self.title
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct AccessAbilities {
    pub destroy: bool,
    pub update: bool,
    pub partial_update: bool,
    pub retrieve: bool,
    pub set_role_to: Vec<Role>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Access {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub abilities: AccessAbilities,
}

impl Access {
    pub fn member_name(&self) -> String {
        match (&self.user, &self.team) {
            (Some(user), _) => user.display_name().to_string(),
            (None, Some(team)) if !team.is_empty() => team.clone(),
            _ => "Unknown member".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PadAccess {
    pub id: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pad {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub accesses: Vec<PadAccess>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Paginated list envelope returned by every list endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_doc_contract_deserialize_with_missing_abilities() {
        let json = r#"{
            "id": "d1",
            "title": "Roadmap",
            "link_reach": "authenticated",
            "link_role": "editor",
            "abilities": {"link_configuration": true}
        }"#;
        let doc: Doc = serde_json::from_str(json).expect("doc should parse");
        assert_eq!(doc.link_reach, LinkReach::Authenticated);
        assert_eq!(doc.link_role, LinkRole::Editor);
        assert!(doc.abilities.link_configuration);
        assert!(!doc.abilities.destroy);
        assert!(!doc.is_public());
        assert_eq!(doc.nb_accesses, 0);
    }

    #[test]
    fn test_doc_display_title_falls_back() {
        let doc: Doc = serde_json::from_str(r#"{"id": "d1", "title": "  "}"#).unwrap();
        assert_eq!(doc.display_title(), "Untitled document");
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_value(Role::Administrator).unwrap(),
            serde_json::json!("administrator")
        );
        assert_eq!(Role::from_str("owner").unwrap(), Role::Owner);
        assert_eq!(Role::Editor.as_ref(), "editor");
        assert!(Role::Owner.is_privileged());
        assert!(!Role::Editor.is_privileged());
    }

    #[test]
    fn test_access_with_team_and_abilities() {
        let json = r#"{
            "id": "a1",
            "role": "editor",
            "user": null,
            "team": "design",
            "abilities": {"destroy": true, "set_role_to": ["reader", "administrator"]}
        }"#;
        let access: Access = serde_json::from_str(json).unwrap();
        assert_eq!(access.member_name(), "design");
        assert_eq!(
            access.abilities.set_role_to,
            vec![Role::Reader, Role::Administrator]
        );
    }

    #[test]
    fn test_user_display_name_prefers_full_name() {
        let mut user = User {
            id: "u1".to_string(),
            email: "dave@work.com".to_string(),
            full_name: Some("David Bowman".to_string()),
            short_name: None,
        };
        assert_eq!(user.display_name(), "David Bowman");
        user.full_name = Some(String::new());
        assert_eq!(user.display_name(), "dave@work.com");
    }

    #[test]
    fn test_pad_page_contract_deserialize() {
        let json = r#"{
            "count": 1,
            "results": [{"id": "1", "name": "Team 1", "accesses": [{"id": "1", "role": "owner"}]}]
        }"#;
        let page: Page<Pad> = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 1);
        assert!(page.next.is_none());
        assert_eq!(page.results[0].accesses[0].role, Role::Owner);
    }
}
