use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{Request, header},
};
use regional_marketplace_api::{
    entity::sea_orm_active_enums::Role,
    error::AppError,
    middleware::auth::AuthUser,
    services::auth_service::{hash_password, issue_token, verify_password},
};
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn set_secret() {
    // every test writes the same value
    unsafe { std::env::set_var("JWT_SECRET", SECRET) };
}

#[tokio::test]
async fn issued_token_is_accepted_by_the_extractor() {
    set_secret();
    let user_id = Uuid::new_v4();
    let token = issue_token(user_id, Role::Producer).expect("token");

    let request = Request::builder()
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(())
        .expect("request");
    let (mut parts, _) = request.into_parts();

    let user = <AuthUser as FromRequestParts<()>>::from_request_parts(&mut parts, &())
        .await
        .expect("auth user");
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.role, Role::Producer);
}

#[tokio::test]
async fn missing_header_is_unauthorized_unless_optional() {
    set_secret();
    let request = Request::builder().body(()).expect("request");
    let (mut parts, _) = request.into_parts();

    let required = <AuthUser as FromRequestParts<()>>::from_request_parts(&mut parts, &()).await;
    assert!(matches!(required, Err(AppError::Unauthorized)));

    let optional =
        <AuthUser as OptionalFromRequestParts<()>>::from_request_parts(&mut parts, &()).await;
    assert!(matches!(optional, Ok(None)));
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    set_secret();
    let token = issue_token(Uuid::new_v4(), Role::Consumer).expect("token");
    let request = Request::builder()
        .header(header::AUTHORIZATION, format!("Bearer {token}x"))
        .body(())
        .expect("request");
    let (mut parts, _) = request.into_parts();

    let result = <AuthUser as FromRequestParts<()>>::from_request_parts(&mut parts, &()).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[test]
fn password_hash_verifies_only_the_original() {
    let hash = hash_password("correct horse").expect("hash");
    assert!(verify_password("correct horse", &hash).expect("verify"));
    assert!(!verify_password("wrong horse", &hash).expect("verify"));
}
