//! End-to-end tests driving the router through tower's `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use users_api::email::MailError;
use users_api::{router, AppState, NotificationSender, SharedState, UsersApiConfig};
use users_org::{
    Group, GroupId, I18nText, Organization, OrganizationId, PrivacyLevel, User, UserEdgeLabel,
    UserId,
};

/// Sender that always succeeds, so handlers take their happy-path branch.
struct OkSender;

#[async_trait]
impl NotificationSender for OkSender {
    async fn send_signup(&self, _user: &User, _url: &str) -> Result<(), MailError> {
        Ok(())
    }

    async fn send_welcome(&self, _user: &User) -> Result<(), MailError> {
        Ok(())
    }

    async fn send_password_reset(&self, _user: &User, _url: &str) -> Result<(), MailError> {
        Ok(())
    }

    async fn send_admin_notice(&self, _subject: &str, _body: &str) -> Result<(), MailError> {
        Ok(())
    }
}

fn test_app() -> (SharedState, Router) {
    let config = UsersApiConfig::default().without_dns_validation();
    let state = AppState::with_mailer(config, Arc::new(OkSender));
    let app = router(state.clone());
    (state, app)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::from_bytes(method.as_bytes()).unwrap())
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn sign_up(app: &Router, login: &str) {
    let response = app
        .clone()
        .oneshot(json_request(
            "ADD",
            &format!("/users/{login}"),
            json!({
                "email": format!("{login}@example.org"),
                "gpgpublickeyring": "-----BEGIN PGP PUBLIC KEY BLOCK-----",
                "password": "secret-pass-1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// AUTH and return the full Set-Cookie value.
async fn sign_in(app: &Router, login: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "AUTH",
            &format!("/users/{login}"),
            json!({ "login": login, "password": "secret-pass-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned()
}

#[tokio::test]
async fn test_signup_rejects_invalid_email() {
    let (_state, app) = test_app();
    let response = app
        .oneshot(json_request(
            "ADD",
            "/users/alice",
            json!({
                "email": "not-an-email",
                "gpgpublickeyring": "key material",
                "password": "secret-pass-1",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["property"], "email");
}

#[tokio::test]
async fn test_signup_rejects_short_password() {
    let (_state, app) = test_app();
    let response = app
        .oneshot(json_request(
            "ADD",
            "/users/alice",
            json!({
                "email": "alice@example.org",
                "gpgpublickeyring": "key material",
                "password": "short",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["property"], "password");
}

#[tokio::test]
async fn test_signup_rejects_short_username() {
    let (_state, app) = test_app();
    let response = app
        .oneshot(json_request(
            "ADD",
            "/users/al",
            json!({
                "email": "al@example.org",
                "gpgpublickeyring": "key material",
                "password": "secret-pass-1",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["property"], "username");
}

#[tokio::test]
async fn test_signup_requires_gpg_keyring() {
    let (state, app) = test_app();
    let response = app
        .oneshot(json_request(
            "ADD",
            "/users/alice",
            json!({ "email": "alice@example.org", "password": "secret-pass-1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["property"], "gpgpublickeyring");
    // No account was created.
    assert!(state.users.read().unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_creates_account_and_rejects_duplicate() {
    let (state, app) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "ADD",
            "/users/alice",
            json!({
                "email": "alice@example.org",
                "gpgpublickeyring": "key material",
                "password": "secret-pass-1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["@id"], "alice");
    assert_eq!(body["isAuthenticated"], false);
    assert_eq!(body["verificationMailSent"], true);
    assert_eq!(state.verification_tokens.len(), 1);

    // The same login again, case-insensitively.
    let response = app
        .oneshot(json_request(
            "ADD",
            "/users/Alice",
            json!({
                "email": "other@example.org",
                "gpgpublickeyring": "key material",
                "password": "secret-pass-1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unsupported_verb_is_rejected() {
    let (_state, app) = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/users/alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_auth_sets_session_cookie() {
    let (state, app) = test_app();
    sign_up(&app, "alice").await;

    let cookie = sign_in(&app, "alice").await;
    assert!(cookie.starts_with("SocialOpenData=login="));
    assert!(cookie.contains(":username="));
    assert!(cookie.contains(":securitytoken="));
    assert!(cookie.ends_with("Path=/"));
    assert_eq!(state.sessions.len(), 1);

    // The cookie expires one session lifetime (30 days) from now.
    let expires = cookie
        .split("Expires=")
        .nth(1)
        .and_then(|rest| rest.split(';').next())
        .unwrap();
    let expires = chrono::NaiveDateTime::parse_from_str(expires, "%a, %d %b %Y %H:%M:%S GMT")
        .unwrap()
        .and_utc();
    let remaining = expires - chrono::Utc::now();
    assert!(remaining > chrono::Duration::days(29));
    assert!(remaining <= chrono::Duration::days(30));
}

#[tokio::test]
async fn test_auth_rejects_wrong_password() {
    let (_state, app) = test_app();
    sign_up(&app, "alice").await;

    let response = app
        .oneshot(json_request(
            "AUTH",
            "/users/alice",
            json!({ "login": "alice", "password": "wrong-pass-99" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_rejects_login_url_mismatch() {
    let (_state, app) = test_app();
    sign_up(&app, "alice").await;

    let response = app
        .oneshot(json_request(
            "AUTH",
            "/users/alice",
            json!({ "login": "bobby", "password": "secret-pass-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["property"], "login");
}

#[tokio::test]
async fn test_deauth_revokes_the_session() {
    let (state, app) = test_app();
    sign_up(&app, "alice").await;
    let cookie = sign_in(&app, "alice").await;
    assert_eq!(state.sessions.len(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::from_bytes(b"DEAUTH").unwrap())
                .uri("/users/alice")
                .header(COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let expired = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(expired.contains("1970"));
    assert_eq!(state.sessions.len(), 0);
}

#[tokio::test]
async fn test_list_users_hides_private_accounts() {
    let (state, app) = test_app();
    {
        let mut users = state.users.write().unwrap();
        users.insert(
            UserId::parse("alice").unwrap(),
            User::new(UserId::parse("alice").unwrap(), "alice@example.org"),
        );
        let mut hidden = User::new(UserId::parse("bobby").unwrap(), "bobby@example.org");
        hidden.is_public = false;
        users.insert(hidden.id().clone(), hidden);
    }

    let response = app.oneshot(get("/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["@id"], "alice");
}

#[tokio::test]
async fn test_verification_token_is_single_use() {
    let (state, app) = test_app();
    let alice = UserId::parse("alice").unwrap();
    state
        .users
        .write()
        .unwrap()
        .insert(alice.clone(), User::new(alice.clone(), "alice@example.org"));
    let token = state.verification_tokens.create(alice.clone());

    let response = app
        .clone()
        .oneshot(get(&format!("/verificationtokens/{}", token.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.users.read().unwrap()[&alice].is_authenticated);
    assert_eq!(state.notifications.of("alice").len(), 1);

    let response = app
        .oneshot(get(&format!("/verificationtokens/{}", token.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_listing_and_detail() {
    let (state, app) = test_app();
    {
        let mut groups = state.groups.write().unwrap();
        let mut admins = Group::new(
            GroupId::parse("admins").unwrap(),
            I18nText::with("en", "Admins"),
        );
        admins.add_member(UserId::parse("alice").unwrap());
        groups.insert(admins.id().clone(), admins);

        let mut secret = Group::new(
            GroupId::parse("secret").unwrap(),
            I18nText::with("en", "Secret"),
        );
        secret.is_public = false;
        groups.insert(secret.id().clone(), secret);
    }

    let response = app.clone().oneshot(get("/groups")).await.unwrap();
    let body = json_body(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["@id"], "admins");
    assert_eq!(list[0]["memberCount"], 1);

    let response = app.clone().oneshot(get("/groups/admins")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["members"], json!(["alice"]));

    let response = app.oneshot(get("/groups/secret")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organization_detail_with_member_expansion() {
    let (state, app) = test_app();
    let alice = UserId::parse("alice").unwrap();
    state
        .users
        .write()
        .unwrap()
        .insert(alice.clone(), User::new(alice.clone(), "alice@example.org"));
    {
        let mut graph = state.graph.write().unwrap();
        let mut acme = Organization::builder(OrganizationId::parse("acme").unwrap())
            .name("en", "ACME Inc.")
            .build();
        acme.link_user(alice.clone(), UserEdgeLabel::IsMember, PrivacyLevel::World);
        graph.insert(acme);
    }

    let response = app
        .clone()
        .oneshot(get("/organizations/acme?expand=members"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["@id"], "acme");
    assert_eq!(body["name"]["en"], "ACME Inc.");
    assert_eq!(body["members"][0]["@id"], "alice");

    let response = app.oneshot(get("/organizations/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_organization_via_add() {
    let (_state, app) = test_app();
    let document = json!({
        "@context": "https://opendata.social/contexts/UsersAPI/organization",
        "@id": "acme",
        "name": { "en": "ACME Inc." },
        "website": "https://acme.example.org"
    });

    let response = app
        .clone()
        .oneshot(json_request("ADD", "/organizations/acme", document.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["@id"], "acme");

    let response = app
        .oneshot(json_request("ADD", "/organizations/acme", document))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_organization_info_requires_sign_in() {
    let (_state, app) = test_app();
    let response = app.oneshot(get("/organizations/acme/info")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_organization_info_prunes_foreign_branches() {
    let (state, app) = test_app();
    sign_up(&app, "alice").await;
    let cookie = sign_in(&app, "alice").await;

    {
        let mut graph = state.graph.write().unwrap();
        let root = OrganizationId::parse("root").unwrap();
        let mine = OrganizationId::parse("mine").unwrap();
        let other = OrganizationId::parse("other").unwrap();
        graph.insert(Organization::builder(root.clone()).build());
        let mut member_org = Organization::builder(mine.clone()).build();
        member_org.link_user(
            UserId::parse("alice").unwrap(),
            UserEdgeLabel::IsMember,
            PrivacyLevel::World,
        );
        graph.insert(member_org);
        graph.insert(Organization::builder(other.clone()).build());
        graph.link_child(&root, &mine);
        graph.link_child(&root, &other);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/organizations/root/info")
                .header(COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["organizationId"], "root");
    assert_eq!(body["youAreMember"], false);
    let childs = body["childs"].as_array().unwrap();
    assert_eq!(childs.len(), 1);
    assert_eq!(childs[0]["organizationId"], "mine");
    assert_eq!(childs[0]["youAreMember"], true);
}

#[tokio::test]
async fn test_landing_page_serves_as_fallback() {
    let (_state, app) = test_app();
    let response = app.oneshot(get("/anything-else")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("Social Open Data"));
}

#[tokio::test]
async fn test_signup_form_is_served() {
    let (_state, app) = test_app();
    let response = app.oneshot(get("/signup")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("<form"));
}
