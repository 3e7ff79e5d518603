use std::path::Path;
use std::time::Duration;

use checkup_questionnaire::draft::AUTH_BACKUP_GRACE;
use checkup_questionnaire::{AuthEvent, AuthEvents, CheckupTemplate, TemplateForm};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use super::admin::{AdminQuery, AdminResource};
use super::session::{AuthSession, SessionFile};
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, RequestBody};
use super::upload::{self, UploadKind};
use super::ApiError;

#[derive(Debug, Deserialize)]
struct RefreshedTokens {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    url: String,
}

/// Authenticated client with the refresh-then-retry interceptor.
pub struct ApiClient {
    transport: Box<dyn HttpTransport>,
    sessions: SessionFile,
    session: Option<AuthSession>,
    events: AuthEvents,
    grace: Duration,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("sessions", &self.sessions)
            .field("logged_in", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Box<dyn HttpTransport>, sessions: SessionFile, events: AuthEvents) -> Self {
        let session = sessions.load();
        Self {
            transport,
            sessions,
            session,
            events,
            grace: AUTH_BACKUP_GRACE,
        }
    }

    pub fn connect(base: Url, sessions: SessionFile, events: AuthEvents) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(base)?;
        Ok(Self::new(Box::new(transport), sessions, events))
    }

    /// Overrides the pause between the session-expired event and the logout.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&AuthSession, ApiError> {
        let request = ApiRequest::new(Method::Post, "/auth/login")
            .json(json!({ "email": email, "password": password }))
            .anonymous();
        let session: AuthSession = self.call(request)?;
        self.sessions.save(&session)?;
        info!("logged in");
        Ok(self.session.insert(session))
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.session = None;
        self.sessions.clear()
    }

    /// Sends `request`; on 401/403 refreshes once and retries once. When the
    /// refresh fails the session-expired event goes out first, then after a
    /// short grace period the session is dropped.
    pub fn send(&mut self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.execute(&request)?;
        if !request.authenticated || !matches!(response.status, 401 | 403) {
            return Ok(response);
        }

        debug!(path = %request.path, status = response.status, "access token rejected");
        match self.refresh() {
            Ok(()) => self.execute(&request),
            Err(err) => {
                warn!(path = %request.path, error = %err, "token refresh failed");
                self.expire_session(&request.path);
                Err(ApiError::SessionExpired)
            }
        }
    }

    pub fn list_templates(&mut self, active_only: bool) -> Result<Vec<CheckupTemplate>, ApiError> {
        let path = if active_only {
            "/checkup-template/active"
        } else {
            "/checkup-template"
        };
        self.call(ApiRequest::get(path))
    }

    pub fn get_template(&mut self, id: &str) -> Result<CheckupTemplate, ApiError> {
        self.call(ApiRequest::get(format!("/checkup-template/{id}")))
    }

    pub fn get_template_by_key(&mut self, test_key: &str) -> Result<CheckupTemplate, ApiError> {
        self.call(ApiRequest::get(format!("/checkup-template/key/{test_key}")))
    }

    pub fn create_template(&mut self, form: &TemplateForm) -> Result<CheckupTemplate, ApiError> {
        let body = serde_json::to_value(form).map_err(ApiError::Decode)?;
        self.call(ApiRequest::new(Method::Post, "/checkup-template").json(body))
    }

    pub fn update_template(
        &mut self,
        id: &str,
        form: &TemplateForm,
    ) -> Result<CheckupTemplate, ApiError> {
        let body = serde_json::to_value(form).map_err(ApiError::Decode)?;
        self.call(ApiRequest::new(Method::Put, format!("/checkup-template/{id}")).json(body))
    }

    pub fn toggle_template_active(&mut self, id: &str) -> Result<CheckupTemplate, ApiError> {
        self.call(ApiRequest::new(
            Method::Patch,
            format!("/checkup-template/{id}/toggle-active"),
        ))
    }

    pub fn delete_template(&mut self, id: &str) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/checkup-template/{id}"));
        let response = self.send(request)?;
        check(response).map(|_| ())
    }

    /// Uploads an image and returns its public URL. Type and size are
    /// checked locally, so a rejected file never reaches the network.
    pub fn upload_image(&mut self, path: &Path, kind: UploadKind) -> Result<String, ApiError> {
        let prepared = upload::prepare(path, kind)?;
        let mut request = ApiRequest::new(Method::Post, "/s3/upload");
        request.body = RequestBody::File {
            file_name: prepared.file_name,
            mime: prepared.mime,
            bytes: prepared.bytes,
        };
        let uploaded: UploadedFile = self.call(request)?;
        Ok(uploaded.url)
    }

    pub fn admin_list(
        &mut self,
        resource: AdminResource,
        query: &AdminQuery,
    ) -> Result<Value, ApiError> {
        let mut request = ApiRequest::get(resource.path());
        if resource.is_paged() {
            if let Some(filter) = &query.filter {
                let key = match resource {
                    AdminResource::Users => "email",
                    _ => "status",
                };
                request = request.query(key, filter);
            }
            request = request.query("page", query.page).query("limit", query.limit);
        }
        self.call(request)
    }

    pub fn admin_get(&mut self, resource: AdminResource, id: &str) -> Result<Value, ApiError> {
        self.call(ApiRequest::get(format!("{}/{id}", resource.path())))
    }

    fn call<T: DeserializeOwned>(&mut self, request: ApiRequest) -> Result<T, ApiError> {
        let response = check(self.send(request)?)?;
        serde_json::from_slice(&response.body).map_err(ApiError::Decode)
    }

    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let bearer = self
            .session
            .as_ref()
            .filter(|_| request.authenticated)
            .map(|session| session.access_token.as_str());
        self.transport.execute(request, bearer)
    }

    fn refresh(&mut self) -> Result<(), ApiError> {
        let Some(current) = self.session.as_ref() else {
            return Err(ApiError::SessionExpired);
        };
        let request = ApiRequest::new(Method::Post, "/auth/refresh")
            .json(json!({ "refresh_token": current.refresh_token }))
            .anonymous();
        let response = check(self.transport.execute(&request, None)?)?;
        let tokens: RefreshedTokens =
            serde_json::from_slice(&response.body).map_err(ApiError::Decode)?;

        let mut session = current.clone();
        session.access_token = tokens.access_token;
        session.refresh_token = tokens.refresh_token;
        self.sessions.save(&session)?;
        self.session = Some(session);
        debug!("access token refreshed");
        Ok(())
    }

    fn expire_session(&mut self, request_path: &str) {
        let notified = self.events.emit(&AuthEvent::SessionExpired {
            request_path: request_path.to_string(),
        });
        debug!(subscribers = notified, "session-expired event delivered");
        if !self.grace.is_zero() {
            std::thread::sleep(self.grace);
        }
        if let Err(err) = self.logout() {
            warn!(error = %err, "failed to clear stored session");
        }
    }
}

/// Turns non-2xx responses into [`ApiError::Server`] carrying the body's `message`.
fn check(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ApiError::Server {
        status: response.status,
        code: error_code(&response.body),
    })
}

fn error_code(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => messages
            .iter()
            .find_map(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_reads_string_or_first_array_message() {
        assert_eq!(
            error_code(br#"{"statusCode":409,"message":"TEST_KEY_TAKEN"}"#).as_deref(),
            Some("TEST_KEY_TAKEN")
        );
        assert_eq!(
            error_code(br#"{"message":["title should not be empty","x"]}"#).as_deref(),
            Some("title should not be empty")
        );
        assert_eq!(error_code(b"<html>502</html>"), None);
    }
}
