//! client::requests
//!
//! Typed requests for every coordinator exchange the CLI performs.
//!
//! Each request pairs a query document with its variables and the
//! response payload type. Handlers construct these and hand them to
//! [`super::send`]; nothing else touches the wire format.

use serde::Deserialize;
use serde_json::{json, Value};

use super::Request;
use crate::core::types::{Email, Label, OrgRole, Password, ProjectRole};

/// Create a session (login). Unauthenticated by definition.
pub struct CreateSession {
    pub email: Email,
    pub password: Password,
}

/// An issued session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

impl Request for CreateSession {
    type Output = Session;

    const QUERY: &'static str = "mutation CreateSession($input: SessionInput!) \
        { createSession(input: $input) { token user_id } }";
    const FIELD: &'static str = "createSession";
    const AUTHENTICATED: bool = false;

    fn variables(&self) -> Value {
        json!({
            "input": {
                "email": self.email.as_str(),
                "password": self.password.reveal(),
            }
        })
    }
}

/// Create a user; the coordinator generates the credentials.
pub struct CreateUser {
    pub email: Email,
    pub name: String,
}

/// Credentials returned exactly once at creation time.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub id: String,
    pub email: String,
    pub password: String,
}

impl Request for CreateUser {
    type Output = CreatedUser;

    const QUERY: &'static str = "mutation CreateUser($input: NewUserInput!) \
        { createUser(input: $input) { id email password } }";
    const FIELD: &'static str = "createUser";

    fn variables(&self) -> Value {
        json!({
            "input": {
                "email": self.email.as_str(),
                "name": self.name,
            }
        })
    }
}

/// A role record as returned by the coordinator.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleRecord {
    pub label: String,
}

/// The caller's organization role.
pub struct MyRole;

impl Request for MyRole {
    type Output = RoleRecord;

    const QUERY: &'static str = "query MyRole { myRole { label } }";
    const FIELD: &'static str = "myRole";

    fn variables(&self) -> Value {
        json!({})
    }
}

/// The caller's role within a project.
pub struct MyProjectRole {
    pub project: Label,
}

impl Request for MyProjectRole {
    type Output = RoleRecord;

    const QUERY: &'static str = "query MyProjectRole($project: Label!) \
        { myProjectRole(project: $project) { label } }";
    const FIELD: &'static str = "myProjectRole";

    fn variables(&self) -> Value {
        json!({ "project": self.project.as_str() })
    }
}

/// Assign an organization role to a user.
pub struct SetOrgRole {
    pub email: Email,
    pub role: OrgRole,
}

impl Request for SetOrgRole {
    type Output = ();

    const QUERY: &'static str = "mutation SetOrgRole($input: SetRoleInput!) \
        { setOrgRole(input: $input) }";
    const FIELD: &'static str = "setOrgRole";

    fn variables(&self) -> Value {
        json!({
            "input": {
                "email": self.email.as_str(),
                "role": self.role.label(),
            }
        })
    }
}

/// Assign a project role to a user.
pub struct SetProjectRole {
    pub email: Email,
    pub role: ProjectRole,
    pub project: Label,
}

impl Request for SetProjectRole {
    type Output = ();

    const QUERY: &'static str = "mutation SetProjectRole($input: SetProjectRoleInput!) \
        { setProjectRole(input: $input) }";
    const FIELD: &'static str = "setProjectRole";

    fn variables(&self) -> Value {
        json!({
            "input": {
                "email": self.email.as_str(),
                "role": self.role.label(),
                "project": self.project.as_str(),
            }
        })
    }
}

/// Issue an API token for the current user.
pub struct CreateToken;

/// A freshly issued token; the secret is shown once and never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedToken {
    pub id: String,
    pub secret: String,
}

impl Request for CreateToken {
    type Output = CreatedToken;

    const QUERY: &'static str = "mutation CreateToken { createToken { id secret } }";
    const FIELD: &'static str = "createToken";

    fn variables(&self) -> Value {
        json!({})
    }
}

/// List the current user's token ids.
pub struct ListTokens;

impl Request for ListTokens {
    type Output = Vec<String>;

    const QUERY: &'static str = "query Tokens { tokens }";
    const FIELD: &'static str = "tokens";

    fn variables(&self) -> Value {
        json!({})
    }
}

/// Revoke a token by id.
pub struct RemoveToken {
    pub id: String,
}

impl Request for RemoveToken {
    type Output = ();

    const QUERY: &'static str = "mutation RemoveToken($id: ID!) { removeToken(id: $id) }";
    const FIELD: &'static str = "removeToken";

    fn variables(&self) -> Value {
        json!({ "id": self.id })
    }
}

/// Create a project.
pub struct CreateProject {
    pub label: Label,
    pub description: Option<String>,
}

/// An opaque project record.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Request for CreateProject {
    type Output = Project;

    const QUERY: &'static str = "mutation CreateProject($input: NewProjectInput!) \
        { createProject(input: $input) { label description } }";
    const FIELD: &'static str = "createProject";

    fn variables(&self) -> Value {
        json!({
            "input": {
                "label": self.label.as_str(),
                "description": self.description,
            }
        })
    }
}

/// List projects visible to the current user.
pub struct ListProjects;

impl Request for ListProjects {
    type Output = Vec<Project>;

    const QUERY: &'static str = "query Projects { projects { label description } }";
    const FIELD: &'static str = "projects";

    fn variables(&self) -> Value {
        json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_session_is_unauthenticated() {
        assert!(!CreateSession::AUTHENTICATED);
        assert!(SetOrgRole::AUTHENTICATED);
    }

    #[test]
    fn set_org_role_variables() {
        let request = SetOrgRole {
            email: Email::new("friend@cape.com").unwrap(),
            role: OrgRole::Admin,
        };
        assert_eq!(
            request.variables(),
            json!({"input": {"email": "friend@cape.com", "role": "admin"}})
        );
    }

    #[test]
    fn create_session_variables_carry_the_password() {
        let request = CreateSession {
            email: Email::new("admin@cape.com").unwrap(),
            password: Password::new("super-secret").unwrap(),
        };
        let vars = request.variables();
        assert_eq!(vars["input"]["password"], "super-secret");
    }

    #[test]
    fn list_tokens_has_empty_variables() {
        assert_eq!(ListTokens.variables(), json!({}));
        assert_eq!(ListTokens::FIELD, "tokens");
    }
}
