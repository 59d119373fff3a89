//! Typed endpoint wrappers.
//!
//! Thin layer over the executor: each method names a path, picks a verb,
//! and decodes the response into a domain type. Resilience, redirects,
//! and cancellation all come from `execute`.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use skylift_domain::{
    ApiError, ApiResult, ClientAccount, CreateProjectEnvRequest, CreateProjectRequest,
    ImportRequest, Items, Operation, Project, Region, SearchRequest, SearchResult, Service, User,
};

use crate::executor::ApiClient;

pub(crate) fn operation_path(id: &str) -> String {
    format!("/api/v1/operation/{id}")
}

impl ApiClient {
    pub(crate) fn decode<T: DeserializeOwned>(&self, path: &str, bytes: &[u8]) -> ApiResult<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::Malformed(format!("unexpected response from {path}: {e}")))
    }

    async fn request_json<T: DeserializeOwned>(&self, method: Method, path: &str) -> ApiResult<T> {
        let bytes = self.execute::<()>(method, path, None).await?;
        self.decode(path, &bytes)
    }

    async fn request_json_with_body<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.execute(method, path, Some(body)).await?;
        self.decode(path, &bytes)
    }

    /// Fetch the authenticated user.
    pub async fn current_user(&self) -> ApiResult<User> {
        self.request_json(Method::GET, "/api/v1/user/info").await
    }

    /// Resolve the client account id the token belongs to.
    pub async fn client_id(&self) -> ApiResult<String> {
        let user = self.current_user().await?;
        user.client_user_list
            .into_iter()
            .next()
            .map(|cu| cu.client_id)
            .ok_or_else(|| ApiError::Malformed("user has no client account".into()))
    }

    /// Account details for the authenticated user's first client.
    pub async fn client_account(&self) -> ApiResult<ClientAccount> {
        let id = self.client_id().await?;
        self.request_json(Method::GET, &format!("/api/v1/client/{id}")).await
    }

    pub async fn list_regions(&self) -> ApiResult<Vec<Region>> {
        let items: Items<Region> = self.request_json(Method::GET, "/api/v1/region").await?;
        Ok(items.items)
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> ApiResult<Project> {
        self.request_json_with_body(Method::POST, "/api/v1/project", request).await
    }

    pub async fn get_project(&self, project_id: &str) -> ApiResult<Project> {
        self.request_json(Method::GET, &format!("/api/v1/project/{project_id}")).await
    }

    /// Projects owned by `client_id`.
    pub async fn list_projects(&self, client_id: &str) -> ApiResult<Vec<Project>> {
        let search = SearchRequest::eq_filter("clientId", client_id);
        let result: SearchResult<Project> = self
            .request_json_with_body(Method::POST, "/api/v1/project/search", &search)
            .await?;
        Ok(result.items)
    }

    /// Delete a project; completion is tracked by the returned operation.
    pub async fn delete_project(&self, project_id: &str) -> ApiResult<Operation> {
        self.request_json(Method::DELETE, &format!("/api/v1/project/{project_id}")).await
    }

    pub async fn list_services(&self, project_id: &str) -> ApiResult<Vec<Service>> {
        let search = SearchRequest::eq_filter("projectId", project_id);
        let result: SearchResult<Service> = self
            .request_json_with_body(Method::POST, "/api/v1/service/search", &search)
            .await?;
        Ok(result.items)
    }

    pub async fn get_service(&self, service_id: &str) -> ApiResult<Service> {
        self.request_json(Method::GET, &format!("/api/v1/service/{service_id}")).await
    }

    pub async fn start_service(&self, service_id: &str) -> ApiResult<Operation> {
        self.request_json(Method::PUT, &format!("/api/v1/service/{service_id}/start")).await
    }

    pub async fn stop_service(&self, service_id: &str) -> ApiResult<Operation> {
        self.request_json(Method::PUT, &format!("/api/v1/service/{service_id}/stop")).await
    }

    /// Delete a service. The response body carries nothing useful.
    pub async fn delete_service(&self, service_id: &str) -> ApiResult<()> {
        self.execute::<()>(Method::DELETE, &format!("/api/v1/service/{service_id}"), None)
            .await?;
        Ok(())
    }

    pub async fn enable_subdomain(&self, service_id: &str) -> ApiResult<Operation> {
        self.request_json(Method::PUT, &format!("/api/v1/service/{service_id}/enable-subdomain"))
            .await
    }

    pub async fn disable_subdomain(&self, service_id: &str) -> ApiResult<Operation> {
        self.request_json(Method::PUT, &format!("/api/v1/service/{service_id}/disable-subdomain"))
            .await
    }

    /// Import services into a project from a declarative definition.
    pub async fn import_services(&self, request: &ImportRequest) -> ApiResult<Vec<Operation>> {
        let items: Items<Operation> = self
            .request_json_with_body(Method::POST, "/api/v1/service/import", request)
            .await?;
        Ok(items.items)
    }

    pub async fn create_project_env(
        &self,
        request: &CreateProjectEnvRequest,
    ) -> ApiResult<Operation> {
        self.request_json_with_body(Method::POST, "/api/v1/project-env", request).await
    }

    pub async fn get_operation(&self, operation_id: &str) -> ApiResult<Operation> {
        self.request_json(Method::GET, &operation_path(operation_id)).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use skylift_domain::ApiError;

    use crate::ApiClient;

    fn client(base: &str) -> ApiClient {
        ApiClient::builder().base_url(base).token("test-token").build().expect("client")
    }

    #[tokio::test]
    async fn current_user_decodes_and_sends_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user/info"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-1",
                "email": "dev@example.com",
                "fullName": "Dev",
                "clientUserList": [{"id": "cu-1", "clientId": "client-9"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let user = client.current_user().await.expect("user");
        assert_eq!(user.id, "user-1");
        assert_eq!(client.client_id().await.expect("client id"), "client-9");
    }

    #[tokio::test]
    async fn client_id_without_associations_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-1",
                "email": "dev@example.com",
                "clientUserList": []
            })))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let err = client.client_id().await.expect_err("should fail");
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn client_account_resolves_through_the_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/user/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-1",
                "email": "dev@example.com",
                "clientUserList": [{"id": "cu-1", "clientId": "client-9"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/client/client-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "client-9",
                "accountName": "Acme"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let account = client.client_account().await.expect("account");
        assert_eq!(account.id, "client-9");
        assert_eq!(account.account_name, "Acme");
    }

    #[tokio::test]
    async fn list_regions_unwraps_items_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/region"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"name": "prg1", "isDefault": true},
                    {"name": "fra1", "isDefault": false}
                ]
            })))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let regions = client.list_regions().await.expect("regions");
        assert_eq!(regions.len(), 2);
        assert!(regions[0].is_default);
    }

    #[tokio::test]
    async fn list_projects_sends_client_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/project/search"))
            .and(body_partial_json(serde_json::json!({
                "search": [{"name": "clientId", "operator": "eq", "value": "client-9"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "p-1", "name": "demo", "clientId": "client-9"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let projects = client.list_projects("client-9").await.expect("projects");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "demo");
    }

    #[tokio::test]
    async fn start_service_returns_operation() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/service/svc-1/start"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "op-1",
                "status": "PENDING",
                "serviceId": "svc-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let operation = client.start_service("svc-1").await.expect("operation");
        assert_eq!(operation.id, "op-1");
        assert!(!operation.phase().is_terminal());
    }

    #[tokio::test]
    async fn malformed_success_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/region"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let err = client.list_regions().await.expect_err("should fail");
        assert!(matches!(err, ApiError::Malformed(_)));
    }
}
