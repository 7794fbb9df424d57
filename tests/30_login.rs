mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::{TestServer, ADMIN_PASSWORD, ADMIN_USERNAME};

#[tokio::test]
async fn wrong_password_then_right_password() -> Result<()> {
    let server = TestServer::installed().await?;
    let browser = server.browser()?;

    let page = browser
        .post("/login", &[("username", ADMIN_USERNAME), ("password", "nope")])
        .await?;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.has_alert("danger", "invalid credentials"));
    assert!(!browser.has_session());

    let page = browser
        .post("/login", &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
        .await?;
    assert!(page.redirects_to("/"));

    let page = browser.get("/").await?;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Signed in as <strong>root</strong>"));
    assert!(page.body.contains("<title>Home - Test Console</title>"));

    Ok(())
}

#[tokio::test]
async fn disabled_and_unknown_accounts_get_the_same_message() -> Result<()> {
    let server = TestServer::installed().await?;
    server.add_user("mallory", "pw", false, true).await?;
    let browser = server.browser()?;

    for (username, password) in [("mallory", "pw"), ("nobody", "pw")] {
        let page = browser
            .post("/login", &[("username", username), ("password", password)])
            .await?;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.has_alert("danger", "invalid credentials"));
    }

    assert!(browser.get("/").await?.redirects_to("/login"));
    Ok(())
}

#[tokio::test]
async fn logout_clears_identity_and_alerts_once() -> Result<()> {
    let server = TestServer::installed().await?;
    let browser = server.login(ADMIN_USERNAME, ADMIN_PASSWORD).await?;

    let page = browser.post("/logout", &[]).await?;
    assert!(page.redirects_to("/login"));

    let page = browser.get("/login").await?;
    assert!(page.has_alert("info", "you have been logged out"));

    let page = browser.get("/login").await?;
    assert!(!page.has_alert("info", "you have been logged out"));

    assert!(browser.get("/").await?.redirects_to("/login"));
    Ok(())
}

#[tokio::test]
async fn tampered_cookie_is_anonymous() -> Result<()> {
    let server = TestServer::installed().await?;

    let res = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?
        .get(format!("{}/", server.base_url))
        .header(reqwest::header::COOKIE, "informas=not.a.token")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[reqwest::header::LOCATION], "/login");
    Ok(())
}
