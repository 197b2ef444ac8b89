mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use casedesk::auth::{Capability, Permissions};
use casedesk::backend::FailPoint;
use casedesk::models::{Role, UserProfile};
use uuid::Uuid;

const USERS: &str = "/api/admin/users";

#[tokio::test]
async fn admin_lists_users() -> Result<()> {
    let app = common::spawn_app();
    let token = app.token_for("boss@casedesk.test", Some(Role::Admin));

    let (status, body) = app.get(USERS, Some(&token)).await?;

    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().expect("users array");
    // two seeded accounts plus the caller
    assert_eq!(users.len(), 3);
    assert!(users.iter().any(|u| u["email"] == "boss@casedesk.test"));
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let app = common::spawn_app();
    let (status, body) = app.get(USERS, None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn unknown_token_is_unauthorized() -> Result<()> {
    let app = common::spawn_app();
    let (status, _) = app.get(USERS, Some("not-a-real-token")).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_admin_is_forbidden() -> Result<()> {
    let app = common::spawn_app();
    let token = app.token_for("rep@casedesk.test", Some(Role::Representative));

    let (status, body) = app.get(USERS, Some(&token)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");
    Ok(())
}

#[tokio::test]
async fn organization_admin_is_not_a_user_admin() -> Result<()> {
    let app = common::spawn_app();
    let user = app.backend.add_account("lead@casedesk.test", "password");
    let mut profile = UserProfile::new(user.id, Role::Representative);
    profile.organization_id = Some(Uuid::new_v4());
    profile.is_organization_admin = true;
    app.backend.insert_record(&profile);
    let token = app.backend.issue_session(&user).access_token;

    // Endpoint and route guard share the capability rule
    let permissions = Permissions::for_profile(Some(&profile));
    assert!(permissions.allows(Capability::ManageOrganization));
    assert!(!permissions.allows(Capability::ManageUsers));

    let (status, _) = app.get(USERS, Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn caller_without_profile_is_forbidden() -> Result<()> {
    let app = common::spawn_app();
    let token = app.token_for("ghost@casedesk.test", None);

    let (status, _) = app.get(USERS, Some(&token)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn listing_failure_is_server_error() -> Result<()> {
    let app = common::spawn_app();
    let token = app.token_for("boss@casedesk.test", Some(Role::Admin));
    app.backend.fail(FailPoint::ListUsers);

    let (status, body) = app.get(USERS, Some(&token)).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    Ok(())
}

#[tokio::test]
async fn other_methods_are_rejected() -> Result<()> {
    let app = common::spawn_app();
    let token = app.token_for("boss@casedesk.test", Some(Role::Admin));

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let (status, body) = app.send(method, USERS, Some(&token)).await?;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    }
    Ok(())
}
