//! Admin login, sessions, and back-office forms.

use axum::http::StatusCode;

use parti_poodles_integration_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, TestContext};

#[tokio::test]
async fn test_admin_pages_redirect_to_login() {
    let ctx = TestContext::new();
    for path in ["/admin", "/admin/puppies", "/admin/inquiries", "/admin/profile"] {
        let response = ctx.get(path, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(response.location(), Some("/admin-login"), "GET {path}");
    }
}

#[tokio::test]
async fn test_login_page_renders() {
    let ctx = TestContext::new();

    let response = ctx.get("/admin-login", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Staff login"));
    assert!(response.body.contains("name=\"password\""));
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let ctx = TestContext::with_admin().await;

    let response = ctx
        .post_form(
            "/admin-login",
            &[("username", ADMIN_USERNAME), ("password", "wrong-password")],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body.contains("Invalid username or password"));
    assert!(response.session_cookie().is_none());
}

#[tokio::test]
async fn test_unknown_user_rejected() {
    let ctx = TestContext::with_admin().await;

    let response = ctx
        .post_form(
            "/admin-login",
            &[("username", "nobody"), ("password", ADMIN_PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_then_logout() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    let dashboard = ctx.get("/admin", Some(&cookie)).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("Welcome back"));

    // The login page sends a logged-in admin to the dashboard
    let login_page = ctx.get("/admin-login", Some(&cookie)).await;
    assert_eq!(login_page.location(), Some("/admin"));

    let logout = ctx.post_form("/admin/logout", &[], Some(&cookie)).await;
    assert_eq!(logout.location(), Some("/admin-login"));

    let after = ctx.get("/admin", Some(&cookie)).await;
    assert_eq!(after.location(), Some("/admin-login"));
}

#[tokio::test]
async fn test_admin_creates_puppy_through_form() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    let created = ctx
        .post_form(
            "/admin/puppies",
            &[("name", "Coco"), ("status", "available"), ("price_min", "3,200")],
            Some(&cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    let location = created.location().expect("redirect");
    assert!(location.starts_with("/admin/puppies?success="), "{location}");

    let public = ctx.get("/puppies", None).await;
    assert!(public.body.contains("Coco"));
    assert!(public.body.contains("$3,200"));
}

#[tokio::test]
async fn test_admin_form_error_is_flashed() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    let response = ctx
        .post_form("/admin/puppies", &[("color", "Red")], Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location().expect("redirect");
    assert!(location.starts_with("/admin/puppies?error="), "{location}");
}

#[tokio::test]
async fn test_admin_list_pages_render() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    for path in [
        "/admin/puppies",
        "/admin/litters",
        "/admin/parent-dogs",
        "/admin/inquiries",
        "/admin/customers",
        "/admin/gallery",
        "/admin/profile",
    ] {
        let response = ctx.get(path, Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "GET {path}: {}", response.body);
    }
}

#[tokio::test]
async fn test_profile_update_changes_display_name() {
    let ctx = TestContext::with_admin().await;
    let cookie = ctx.login().await;

    let saved = ctx
        .post_form(
            "/admin/profile",
            &[("first_name", "Pat"), ("last_name", "Owner")],
            Some(&cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::SEE_OTHER);

    // Updating the session cycles its id
    let cookie = saved.session_cookie().unwrap_or(cookie);
    let dashboard = ctx.get("/admin", Some(&cookie)).await;
    assert!(dashboard.body.contains("Pat Owner"));
}
