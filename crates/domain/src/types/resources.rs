//! Account, project, and service models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_user_list: Vec<ClientUser>,
}

/// A user's association with a billing account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUser {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub role_code: String,
    #[serde(default)]
    pub client: Option<ClientAccount>,
}

/// A billing account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientAccount {
    pub id: String,
    #[serde(default)]
    pub account_name: String,
}

/// A deployment region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub address: String,
}

/// A project groups services under one account and region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub subdomain_host: Option<String>,
}

/// A managed service inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stack_info: Option<ServiceStackInfo>,
    #[serde(default)]
    pub ports: Vec<ServicePort>,
    #[serde(default)]
    pub min_containers: u32,
    #[serde(default)]
    pub max_containers: u32,
    #[serde(default)]
    pub subdomain_access: bool,
    #[serde(default)]
    pub subdomain_host: Option<String>,
}

/// Service stack type information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStackInfo {
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub type_category: String,
    #[serde(default)]
    pub version_name: String,
}

/// A port exposed by a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    pub port: u16,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub http_routing: bool,
    #[serde(default)]
    pub scheme: String,
}

/// Request body for project creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub region_id: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Always serialized, even when empty; the server rejects `null`.
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// Request body for a YAML service import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub project_id: String,
    pub client_id: String,
    pub yaml: String,
}

/// Request body for creating a project-level environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectEnvRequest {
    pub project_id: String,
    pub key: String,
    pub content: String,
    pub sensitive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_project_request_serializes_empty_tags() {
        let req = CreateProjectRequest {
            name: "demo".into(),
            region_id: "reg-1".into(),
            client_id: "client-1".into(),
            description: None,
            tag_list: Vec::new(),
        };
        let json = serde_json::to_value(&req).expect("request should serialize");
        assert_eq!(json["tagList"], serde_json::json!([]));
        assert!(json.get("description").is_none());
    }

    #[test]
    fn service_decodes_without_optional_blocks() {
        let svc: Service = serde_json::from_str(
            r#"{"id":"svc-1","projectId":"proj-1","name":"api","status":"ACTIVE"}"#,
        )
        .expect("minimal service should decode");
        assert!(svc.ports.is_empty());
        assert!(svc.stack_info.is_none());
        assert!(!svc.subdomain_access);
    }

    #[test]
    fn user_decodes_client_associations() {
        let user: User = serde_json::from_str(
            r#"{
                "id": "user-1",
                "email": "dev@example.com",
                "clientUserList": [
                    {"id": "cu-1", "clientId": "client-1", "roleCode": "OWNER"}
                ]
            }"#,
        )
        .expect("user should decode");
        assert_eq!(user.client_user_list.len(), 1);
        assert_eq!(user.client_user_list[0].client_id, "client-1");
    }
}
