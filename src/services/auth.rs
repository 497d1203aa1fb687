//! Sign-in, sign-out and profile.

use crate::auth::{AdminUser, AuthStore, SessionEvent};
use crate::endpoint::Endpoint;
use crate::envelope::{decode_record, unwrap_envelope};
use crate::error::{Error, Result};
use crate::http::ApiClient;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        AuthService { client }
    }

    fn store(&self) -> &AuthStore {
        self.client.auth()
    }

    /// Sign in and persist the session.
    ///
    /// The token is read from `token` at the top level or under `data`; the
    /// user likewise from `user` or `data.user`. Without a user record, a
    /// minimal one is synthesized from the email.
    ///
    /// # Errors
    /// Returns `Error::Application` when the response carries no token, and
    /// the usual transport errors otherwise.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser> {
        let body = json!({ "email": email, "password": password });
        let response = self
            .client
            .post(Endpoint::AuthLogin.template(), &body)
            .await?;

        let (token, user) = parse_login(&response, email)?;
        self.store().persist(&token, &user)?;
        info!("Signed in as {}", user.email);
        Ok(user)
    }

    /// Sign out. The backend call is best effort; the local session is always
    /// cleared.
    ///
    /// Exactly one session event is published: [`SessionEvent::LoggedOut`],
    /// or only the client's [`SessionEvent::Unauthorized`] when the backend
    /// rejects the logout with 401.
    pub async fn logout(&self) {
        if self.store().is_authenticated() {
            match self
                .client
                .post(Endpoint::AuthLogout.template(), &json!({}))
                .await
            {
                Ok(_) => {}
                Err(e) if e.is_unauthenticated() => {
                    self.store().clear();
                    info!("Signed out (session had already expired)");
                    return;
                }
                Err(e) => debug!("Remote logout failed: {}", e),
            }
        }
        self.end_local_session();
    }

    /// Clear the persisted session and publish [`SessionEvent::LoggedOut`]
    /// without calling the backend.
    pub fn end_local_session(&self) {
        self.store().clear();
        self.client.publish(SessionEvent::LoggedOut);
        info!("Signed out");
    }

    /// Profile of the signed-in user. Also refreshes the persisted copy.
    pub async fn profile(&self) -> Result<AdminUser> {
        let value = self
            .client
            .get(Endpoint::AuthProfile.template(), &Default::default())
            .await?;
        let user: AdminUser = decode_record(value, "user")?;
        if let Some(token) = self.store().token() {
            self.store().persist(&token, &user)?;
        }
        Ok(user)
    }

    /// Create an administrator account. Does not sign in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AdminUser> {
        let body = json!({ "name": name, "email": email, "password": password });
        let value = self
            .client
            .post(Endpoint::AuthRegister.template(), &body)
            .await?;
        let value = unwrap_envelope(value)?;
        Ok(decode_record(value, "user").unwrap_or_else(|_| AdminUser {
            name: name.to_string(),
            ..AdminUser::synthesized(email)
        }))
    }
}

/// Extract the token and user from a login response.
///
/// # Errors
/// Returns `Error::Application` for `success: false` or a missing token.
pub fn parse_login(response: &Value, email: &str) -> Result<(String, AdminUser)> {
    if response.get("success").and_then(Value::as_bool) == Some(false) {
        let message = response
            .get("message")
            .or_else(|| response.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("login failed");
        return Err(Error::Application(message.to_string()));
    }

    let data = response.get("data");
    let lookup = |key: &str| {
        response
            .get(key)
            .or_else(|| data.and_then(|d| d.get(key)))
            .filter(|v| !v.is_null())
    };

    let token = lookup("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Application("login response carried no token".to_string()))?
        .to_string();

    let user = match lookup("user") {
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Unreadable user in login response ({}); synthesizing", e);
            AdminUser::synthesized(email)
        }),
        None => AdminUser::synthesized(email),
    };

    Ok((token, user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_token_and_user() {
        let response = json!({
            "token": "t1",
            "user": {"_id": "u1", "name": "Owner", "email": "owner@dynasty.test", "role": "superadmin"}
        });
        let (token, user) = parse_login(&response, "owner@dynasty.test").unwrap();
        assert_eq!(token, "t1");
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, "superadmin");
    }

    #[test]
    fn test_nested_token_synthesizes_user() {
        let response = json!({"success": true, "data": {"token": "t2"}});
        let (token, user) = parse_login(&response, "manager@dynasty.test").unwrap();
        assert_eq!(token, "t2");
        assert_eq!(user.name, "manager");
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn test_failures() {
        let err = parse_login(&json!({"success": false, "message": "Invalid credentials"}), "x@y")
            .unwrap_err();
        assert!(matches!(err, Error::Application(ref m) if m == "Invalid credentials"));

        assert!(parse_login(&json!({"data": {"user": {}}}), "x@y").is_err());
    }
}
