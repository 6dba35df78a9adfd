use crate::models::{Access, Doc, LinkReach, LinkRole, Pad, Page, Role, User};
use leptos::logging::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub(crate) const API_VERSION: &str = "v1.0";
pub(crate) const DEFAULT_API_URL: &str = "http://localhost:8071";
pub(crate) const DEFAULT_CONTENT_LANGUAGE: &str = "en-us";

/// Ordering used by every "recent first" list.
pub(crate) const ORDER_RECENT_FIRST: &str = "-created_at";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

/// Extra context a caller attaches to an error so views can tell apart
/// failures coming from different forms.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CauseContext {
    NewMember,
}

/// Response metadata carried by an HTTP error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ErrorCauses {
    pub status: u16,
    /// Flattened messages of the JSON error body.
    pub causes: Vec<String>,
    pub context: Option<CauseContext>,
}

impl ErrorCauses {
    pub fn from_body(status: u16, body: &str, context: Option<CauseContext>) -> Self {
        Self {
            status,
            causes: flatten_error_body(body),
            context,
        }
    }
}

/// Backend validation errors look like `{"field": ["msg", ...], "detail": "msg"}`.
/// Anything that is not a JSON object yields no causes.
pub(crate) fn flatten_error_body(body: &str) -> Vec<String> {
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body)
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for value in map.into_values() {
        match value {
            serde_json::Value::String(s) => out.push(s),
            serde_json::Value::Array(items) => {
                out.extend(items.into_iter().filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                }));
            }
            _ => {}
        }
    }
    out
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub causes: Option<ErrorCauses>,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
            causes: None,
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
            causes: None,
        }
    }

    fn from_response(status: u16, body: &str, message: &str, ctx: Option<CauseContext>) -> Self {
        let kind = if status == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Http
        };
        Self {
            kind,
            message: message.to_string(),
            causes: Some(ErrorCauses::from_body(status, body, ctx)),
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.causes.as_ref().map(|c| c.status)
    }

    /// Message followed by the backend causes, for notifications.
    pub fn describe(&self) -> String {
        match &self.causes {
            Some(c) if !c.causes.is_empty() => format!("{} {}", self.message, c.causes.join(" ")),
            _ => self.message.clone(),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub content_language: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let env = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object());

        let read = |keys: &[&str]| -> Option<String> {
            let env = env.as_ref()?;
            keys.iter().find_map(|k| {
                js_sys::Reflect::get(env, &(*k).into())
                    .ok()
                    .and_then(|v| v.as_string())
                    .filter(|s| !s.trim().is_empty())
            })
        };

        // `window.ENV.API_URL` is the documented key, `api_url` is kept for older deployments.
        let api_url = read(&["API_URL", "api_url"]).unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let locale = read(&["LANGUAGE", "language"]).or_else(|| {
            web_sys::window()
                .and_then(|w| w.navigator().language())
                .filter(|s| !s.is_empty())
        });

        Self {
            api_url,
            content_language: normalize_content_language(locale.as_deref()),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend languages are region-qualified and lowercase (`en-us`, `fr-fr`).
pub(crate) fn normalize_content_language(locale: Option<&str>) -> String {
    let Some(locale) = locale.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_CONTENT_LANGUAGE.to_string();
    };

    let locale = locale.replace('_', "-").to_lowercase();
    match locale.split_once('-') {
        Some((lang, region)) if !lang.is_empty() && !region.is_empty() => {
            format!("{lang}-{region}")
        }
        _ => match locale.trim_end_matches('-') {
            "en" => "en-us".to_string(),
            "" => DEFAULT_CONTENT_LANGUAGE.to_string(),
            lang => format!("{lang}-{lang}"),
        },
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LinkConfigurationRequest {
    pub link_reach: LinkReach,
    pub link_role: LinkRole,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct CreateDocAccessRequest {
    pub user_id: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct UpdateDocAccessRequest {
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) content_language: String,
}

impl ApiClient {
    pub fn new(api_url: &str, content_language: &str) -> Self {
        Self {
            base_url: format!("{}/api/{}/", api_url.trim_end_matches('/'), API_VERSION),
            content_language: content_language.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let env = EnvConfig::new();
        Self::new(&env.api_url, &env.content_language)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = reqwest::Client::new()
            .request(method, self.url(path))
            .header("Content-Language", self.content_language.as_str());

        // Session cookie authenticates every call.
        #[cfg(target_arch = "wasm32")]
        let req = req.fetch_credentials_include();

        req
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        failure: &str,
        ctx: Option<CauseContext>,
    ) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;
        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        let err = ApiError::from_response(status, &body, failure, ctx);
        warn!("api: {failure} ({status})");
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, failure: &str) -> ApiResult<T> {
        let req = self.build(reqwest::Method::GET, path);
        let res = self.send(req, failure, None).await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub async fn list_docs(&self, page: u32) -> ApiResult<Page<Doc>> {
        self.get_json(&docs_list_path(page), "Failed to get the docs.")
            .await
    }

    pub async fn get_doc(&self, id: &str) -> ApiResult<Doc> {
        self.get_json(&format!("documents/{id}/"), "Failed to get the doc.")
            .await
    }

    pub async fn update_doc_link(
        &self,
        id: &str,
        body: &LinkConfigurationRequest,
    ) -> ApiResult<Doc> {
        let req = self
            .build(
                reqwest::Method::PATCH,
                &format!("documents/{id}/link-configuration/"),
            )
            .json(body);
        let res = self
            .send(req, "Failed to update the doc link configuration.", None)
            .await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub async fn list_doc_accesses(&self, doc_id: &str, page: u32) -> ApiResult<Page<Access>> {
        self.get_json(
            &format!("documents/{doc_id}/accesses/?page={page}"),
            "Failed to get the doc accesses.",
        )
        .await
    }

    pub async fn create_doc_access(
        &self,
        doc_id: &str,
        body: &CreateDocAccessRequest,
    ) -> ApiResult<Access> {
        let req = self
            .build(reqwest::Method::POST, &format!("documents/{doc_id}/accesses/"))
            .json(body);
        let res = self
            .send(
                req,
                "Failed to add the member in the doc.",
                Some(CauseContext::NewMember),
            )
            .await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub async fn update_doc_access(
        &self,
        doc_id: &str,
        access_id: &str,
        role: Role,
    ) -> ApiResult<Access> {
        let req = self
            .build(
                reqwest::Method::PATCH,
                &format!("documents/{doc_id}/accesses/{access_id}/"),
            )
            .json(&UpdateDocAccessRequest { role });
        let res = self.send(req, "Failed to update the role.", None).await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub async fn delete_doc_access(&self, doc_id: &str, access_id: &str) -> ApiResult<()> {
        let req = self.build(
            reqwest::Method::DELETE,
            &format!("documents/{doc_id}/accesses/{access_id}/"),
        );
        self.send(req, "Failed to delete the member.", None).await?;
        Ok(())
    }

    pub async fn list_users(&self, query: &str, doc_id: Option<&str>) -> ApiResult<Page<User>> {
        self.get_json(&users_search_path(query, doc_id), "Failed to get the users.")
            .await
    }

    pub async fn list_pads(&self, page: u32) -> ApiResult<Page<Pad>> {
        self.get_json(&pads_list_path(page), "Failed to get the pads.")
            .await
    }
}

pub(crate) fn docs_list_path(page: u32) -> String {
    format!("documents/?page={page}&ordering={ORDER_RECENT_FIRST}")
}

pub(crate) fn pads_list_path(page: u32) -> String {
    format!("pads/?page={page}&ordering={ORDER_RECENT_FIRST}")
}

pub(crate) fn users_search_path(query: &str, doc_id: Option<&str>) -> String {
    let mut path = format!("users/?q={}", urlencoding::encode(query.trim()));
    if let Some(doc_id) = doc_id.filter(|d| !d.is_empty()) {
        path.push_str("&document_id=");
        path.push_str(&urlencoding::encode(doc_id));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_new_builds_versioned_base_url() {
        let client = ApiClient::new("http://localhost:8071/", "fr-fr");
        assert_eq!(client.base_url, "http://localhost:8071/api/v1.0/");
        assert_eq!(client.content_language, "fr-fr");
    }

    #[test]
    fn test_api_client_url_joins_paths() {
        let client = ApiClient::new("https://docs.example.org", "en-us");
        assert_eq!(
            client.url("/documents/abc/accesses/"),
            "https://docs.example.org/api/v1.0/documents/abc/accesses/"
        );
    }

    #[test]
    fn test_list_paths_order_recent_first() {
        assert_eq!(pads_list_path(1), "pads/?page=1&ordering=-created_at");
        assert_eq!(docs_list_path(3), "documents/?page=3&ordering=-created_at");
    }

    #[test]
    fn test_users_search_path_encodes_query_and_doc() {
        assert_eq!(
            users_search_path(" nicole fool@work.com ", Some("d-1")),
            "users/?q=nicole%20fool%40work.com&document_id=d-1"
        );
        assert_eq!(users_search_path("dave", None), "users/?q=dave");
        assert_eq!(users_search_path("dave", Some("")), "users/?q=dave");
    }

    #[test]
    fn test_flatten_error_body_mixes_strings_and_lists() {
        let mut causes = flatten_error_body(r#"{"role": ["bad role", "really"], "detail": "nope"}"#);
        causes.sort();
        assert_eq!(causes, vec!["bad role", "nope", "really"]);
    }

    #[test]
    fn test_flatten_error_body_ignores_non_json() {
        assert!(flatten_error_body("<html>500</html>").is_empty());
        assert!(flatten_error_body("").is_empty());
        assert!(flatten_error_body(r#"["a"]"#).is_empty());
    }

    #[test]
    fn test_error_from_response_carries_causes_and_context() {
        let err = ApiError::from_response(
            400,
            r#"{"user_id": ["This user is already in this document."]}"#,
            "Failed to add the member in the doc.",
            Some(CauseContext::NewMember),
        );
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Failed to add the member in the doc.");
        let causes = err.causes.as_ref().unwrap();
        assert_eq!(causes.context, Some(CauseContext::NewMember));
        assert_eq!(causes.causes, vec!["This user is already in this document."]);
        assert_eq!(
            err.describe(),
            "Failed to add the member in the doc. This user is already in this document."
        );
    }

    #[test]
    fn test_error_from_response_unauthorized() {
        let err = ApiError::from_response(401, "", "Failed to get the docs.", None);
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert_eq!(err.describe(), "Failed to get the docs.");
    }

    #[test]
    fn test_normalize_content_language() {
        assert_eq!(normalize_content_language(None), "en-us");
        assert_eq!(normalize_content_language(Some("  ")), "en-us");
        assert_eq!(normalize_content_language(Some("fr-FR")), "fr-fr");
        assert_eq!(normalize_content_language(Some("en_GB")), "en-gb");
        assert_eq!(normalize_content_language(Some("en")), "en-us");
        assert_eq!(normalize_content_language(Some("fr")), "fr-fr");
    }

    #[test]
    fn test_create_access_request_serialization() {
        let req = CreateDocAccessRequest {
            user_id: "u1".to_string(),
            role: Role::Editor,
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v, serde_json::json!({"user_id": "u1", "role": "editor"}));
    }

    #[test]
    fn test_link_configuration_request_serialization() {
        let req = LinkConfigurationRequest {
            link_reach: LinkReach::Public,
            link_role: LinkRole::Reader,
        };
        let v = serde_json::to_value(req).unwrap();
        assert_eq!(v, serde_json::json!({"link_reach": "public", "link_role": "reader"}));
    }
}
