#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{redirect, StatusCode};
use tokio::net::TcpListener;

use informas::auth::SESSION_COOKIE;
use informas::config::AppConfig;
use informas::database::models::user::User;
use informas::database::Database;
use informas::server::{self, AppState};

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// The console running in-process on an ephemeral port over a private
/// in-memory database
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let mut settings = AppConfig::development();
        settings.http.max_form_bytes = 4096;

        let db = Database::in_memory().await?;
        let state = AppState::new(db, settings).await?;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let app = server::app(state.clone());
        tokio::spawn(async move { axum::serve(listener, app).await });

        Ok(Self { base_url, state })
    }

    /// Spawn and complete installation with the default admin
    pub async fn installed() -> Result<Self> {
        let server = Self::spawn().await?;
        let page = server
            .browser()?
            .post(
                "/install",
                &[
                    ("site_title", "Test Console"),
                    ("admin_username", ADMIN_USERNAME),
                    ("admin_password", ADMIN_PASSWORD),
                    ("admin_email", "root@example.com"),
                ],
            )
            .await?;
        anyhow::ensure!(page.redirects_to("/login"), "install failed: {:?}", page.status);
        Ok(server)
    }

    pub fn browser(&self) -> Result<Browser> {
        Browser::new(&self.base_url)
    }

    /// Insert an account directly, bypassing the pages
    pub async fn add_user(&self, username: &str, password: &str, is_admin: bool, is_disabled: bool) -> Result<User> {
        let mut user = User {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            is_admin,
            is_disabled,
            ..User::default()
        };
        user.set_password(password)?;
        user.save(&mut self.state.db.token()).await?;
        Ok(user)
    }

    /// Browser already signed in as `username`
    pub async fn login(&self, username: &str, password: &str) -> Result<Browser> {
        let browser = self.browser()?;
        let page = browser
            .post("/login", &[("username", username), ("password", password)])
            .await?;
        anyhow::ensure!(page.redirects_to("/"), "login as {} failed", username);
        Ok(browser)
    }
}

/// One client with its own session cookie. Redirects are not followed.
pub struct Browser {
    base_url: String,
    client: reqwest::Client,
    session: Mutex<Option<String>>,
}

#[derive(Debug)]
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl Page {
    pub fn redirects_to(&self, path: &str) -> bool {
        self.status == StatusCode::SEE_OTHER && self.location.as_deref() == Some(path)
    }

    pub fn has_alert(&self, kind: &str, body: &str) -> bool {
        self.body
            .contains(&format!(r#"<div class="alert alert-{}">{}</div>"#, kind, body))
    }
}

impl Browser {
    fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
            session: Mutex::new(None),
        })
    }

    pub fn has_session(&self) -> bool {
        self.session.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub async fn get(&self, path: &str) -> Result<Page> {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<Page> {
        self.send(self.client.post(self.url(path)).form(form)).await
    }

    /// POST with an arbitrary body and content type
    pub async fn post_raw(&self, path: &str, content_type: &str, body: &str) -> Result<Page> {
        self.send(
            self.client
                .post(self.url(path))
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(body.to_string()),
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, mut request: reqwest::RequestBuilder) -> Result<Page> {
        if let Some(value) = self.session.lock().unwrap().clone() {
            request = request.header(COOKIE, format!("{}={}", SESSION_COOKIE, value));
        }

        let response = request.send().await?;

        for header in response.headers().get_all(SET_COOKIE) {
            let header = header.to_str()?;
            let pair = header.split(';').next().unwrap_or_default();
            if let Some(value) = pair.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
                *self.session.lock().unwrap() = (!value.is_empty()).then(|| value.to_string());
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(Page {
            status,
            location,
            body,
        })
    }
}
