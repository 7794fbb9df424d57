mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::TestServer;

#[tokio::test]
async fn health_reports_store_and_install_state() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = reqwest::get(format!("{}/health", server.base_url)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "ok");
    assert_eq!(body["data"]["installed"], false);

    Ok(())
}

#[tokio::test]
async fn every_page_redirects_to_install_until_installed() -> Result<()> {
    let server = TestServer::spawn().await?;
    let browser = server.browser()?;

    for path in ["/", "/login", "/users", "/settings", "/users/1/edit"] {
        let page = browser.get(path).await?;
        assert!(page.redirects_to("/install"), "{} -> {:?}", path, page);
    }

    let page = browser.get("/install").await?;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(r#"name="admin_username""#));

    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_not_found() -> Result<()> {
    let server = TestServer::installed().await?;
    let page = server.browser()?.get("/no-such-page").await?;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    Ok(())
}
