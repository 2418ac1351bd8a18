use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    config::GateConfig,
    state::AppState,
    utils::{
        cookies::{extract_cookie_value, REFRESH_COOKIE_NAME},
        jwt::{verify_access_token, Claims},
    },
};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Verified identity attached to a request that passed the gate. Handlers
/// take this from request extensions instead of trusting ambient headers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.to_string(),
            roles: claims.roles.clone(),
        }
    }
}

/// Outcome of evaluating a single inbound request at the perimeter.
#[derive(Debug, Clone)]
pub enum GateDecision {
    /// Static or internal path; skip entirely.
    Bypass,
    /// Legacy prefix, public pass, or rejection target.
    Redirect(String),
    /// Public allow-list path; proceed unauthenticated.
    Public,
    /// Verified credential; forward with the derived identity.
    Forward(AuthContext),
}

/// Pure decision function over (path, headers, cookies, config). Owns no
/// state; every decision is re-derived per request so it can run at the edge
/// before any application code.
pub fn decide(
    path: &str,
    authorization: Option<&str>,
    cookie: Option<&str>,
    gate: &GateConfig,
    secret: &str,
) -> GateDecision {
    if gate
        .static_prefixes
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
    {
        return GateDecision::Bypass;
    }

    for (old_prefix, new_prefix) in &gate.legacy_prefixes {
        if matches_prefix(path, old_prefix) {
            let remainder = &path[old_prefix.len()..];
            return GateDecision::Redirect(format!("{}{}", new_prefix, remainder));
        }
    }

    if gate
        .public_prefixes
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
    {
        return GateDecision::Public;
    }

    let token = authorization
        .and_then(parse_bearer_token)
        .map(str::to_string)
        .or_else(|| cookie.and_then(|raw| extract_cookie_value(raw, REFRESH_COOKIE_NAME)));

    // Absent and invalid credentials get the same redirect on purpose: the
    // response must not reveal which case occurred.
    let Some(token) = token else {
        return GateDecision::Redirect(login_redirect(&gate.login_path, path));
    };
    let Ok(claims) = verify_access_token(&token, secret) else {
        return GateDecision::Redirect(login_redirect(&gate.login_path, path));
    };

    let is_admin_path = gate
        .admin_prefixes
        .iter()
        .any(|prefix| matches_prefix(path, prefix));
    if is_admin_path && !claims.has_any_role(&gate.admin_roles) {
        return GateDecision::Redirect("/".to_string());
    }

    GateDecision::Forward(AuthContext::from(&claims))
}

/// Perimeter middleware; runs before any page or handler logic.
pub async fn gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let authorization = header_str(&request, header::AUTHORIZATION);
    let cookie = header_str(&request, header::COOKIE);

    let decision = decide(
        &path,
        authorization.as_deref(),
        cookie.as_deref(),
        &state.config.gate,
        &state.config.jwt_secret,
    );

    match decision {
        GateDecision::Bypass | GateDecision::Public => next.run(request).await,
        GateDecision::Redirect(location) => Redirect::temporary(&location).into_response(),
        GateDecision::Forward(context) => {
            let headers = request.headers_mut();
            // Strip whatever the caller sent; only the gate writes these.
            headers.remove(USER_ID_HEADER);
            headers.remove(USER_ROLES_HEADER);
            if let Ok(value) = HeaderValue::from_str(&context.user_id) {
                headers.insert(USER_ID_HEADER, value);
            }
            if let Ok(value) = HeaderValue::from_str(&context.roles.join(",")) {
                headers.insert(USER_ROLES_HEADER, value);
            }
            request.extensions_mut().insert(context);
            next.run(request).await
        }
    }
}

fn header_str(request: &Request, name: header::HeaderName) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(rest) = header.strip_prefix("Bearer ") {
        return Some(rest);
    }
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}

/// Prefix match on path-segment boundaries: `/m` matches `/m` and `/m/app`
/// but not `/materials`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

fn login_redirect(login_path: &str, original: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(original.as_bytes()).collect();
    format!("{}?redirect={}", login_path, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::utils::jwt::{issue_access_token, AccountType, Claims};
    use chrono::Utc;

    const SECRET: &str = "gate-test-secret";

    fn gate_config() -> GateConfig {
        GateConfig::new(false)
    }

    fn claims_with_roles(roles: Vec<String>) -> Claims {
        Claims::new(
            9,
            2,
            "Ops".into(),
            AccountType::Building,
            roles,
            4,
            "Acme".into(),
            6,
            "East Wing".into(),
            1,
        )
    }

    fn bearer(claims: &Claims) -> String {
        format!(
            "Bearer {}",
            issue_access_token(claims, SECRET).expect("issue token")
        )
    }

    #[test]
    fn static_paths_bypass_the_gate() {
        let decision = decide("/assets/app.css", None, None, &gate_config(), SECRET);
        assert!(matches!(decision, GateDecision::Bypass));
    }

    #[test]
    fn legacy_prefix_redirects_and_preserves_remainder() {
        let decision = decide("/workorder/123/edit", None, None, &gate_config(), SECRET);
        match decision {
            GateDecision::Redirect(location) => assert_eq!(location, "/work-orders/123/edit"),
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn public_prefix_matches_exact_and_sub_paths() {
        assert!(matches!(
            decide("/login", None, None, &gate_config(), SECRET),
            GateDecision::Public
        ));
        assert!(matches!(
            decide("/m/home", None, None, &gate_config(), SECRET),
            GateDecision::Public
        ));
        // Boundary check: /materials must not ride on the /m allow entry.
        assert!(!matches!(
            decide("/materials", None, None, &gate_config(), SECRET),
            GateDecision::Public
        ));
    }

    #[test]
    fn preview_is_public_outside_production_only() {
        assert!(matches!(
            decide("/preview/button", None, None, &GateConfig::new(false), SECRET),
            GateDecision::Public
        ));
        assert!(matches!(
            decide("/preview/button", None, None, &GateConfig::new(true), SECRET),
            GateDecision::Redirect(_)
        ));
    }

    #[test]
    fn missing_credentials_redirect_to_login_with_original_path() {
        let decision = decide("/work-orders/7", None, None, &gate_config(), SECRET);
        match decision {
            GateDecision::Redirect(location) => {
                assert_eq!(location, "/login?redirect=%2Fwork-orders%2F7");
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn invalid_token_gets_the_same_redirect_as_absent() {
        let absent = decide("/dashboard", None, None, &gate_config(), SECRET);
        let invalid = decide(
            "/dashboard",
            Some("Bearer garbage"),
            None,
            &gate_config(),
            SECRET,
        );
        match (absent, invalid) {
            (GateDecision::Redirect(a), GateDecision::Redirect(b)) => assert_eq!(a, b),
            other => panic!("expected two redirects, got {other:?}"),
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = claims_with_roles(vec!["ROLE_MANAGER".into()]);
        claims.exp = Utc::now().timestamp() - 3600;
        let decision = decide(
            "/dashboard",
            Some(&bearer(&claims)),
            None,
            &gate_config(),
            SECRET,
        );
        assert!(matches!(decision, GateDecision::Redirect(_)));
    }

    #[test]
    fn cookie_credential_is_accepted_as_fallback() {
        let claims = claims_with_roles(vec!["ROLE_MANAGER".into()]);
        let token = issue_access_token(&claims, SECRET).expect("issue token");
        let cookie = format!("theme=dark; refresh-token={}", token);
        let decision = decide("/dashboard", None, Some(&cookie), &gate_config(), SECRET);
        match decision {
            GateDecision::Forward(context) => assert_eq!(context.user_id, "9"),
            other => panic!("expected forward, got {other:?}"),
        }
    }

    #[test]
    fn admin_path_requires_an_admin_role() {
        let plain = claims_with_roles(vec!["ROLE_MANAGER".into()]);
        let decision = decide(
            "/admin/users",
            Some(&bearer(&plain)),
            None,
            &gate_config(),
            SECRET,
        );
        match decision {
            GateDecision::Redirect(location) => assert_eq!(location, "/"),
            other => panic!("expected redirect to root, got {other:?}"),
        }

        let admin = claims_with_roles(vec!["ROLE_ADMIN".into()]);
        let decision = decide(
            "/admin/users",
            Some(&bearer(&admin)),
            None,
            &gate_config(),
            SECRET,
        );
        match decision {
            GateDecision::Forward(context) => {
                assert_eq!(context.roles, vec!["ROLE_ADMIN".to_string()]);
            }
            other => panic!("expected forward, got {other:?}"),
        }
    }

    #[test]
    fn parse_bearer_token_handles_scheme_case() {
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("BEARER abc"), Some("abc"));
        assert_eq!(parse_bearer_token("Basic abc"), None);
    }
}
