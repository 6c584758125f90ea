//! Login handshake and session establishment
//!
//! The target site sits behind a Django-style form login: GET the form to
//! pick up the CSRF token, POST credentials with that token, follow the
//! redirect to the landing page. The client's cookie store keeps the
//! `csrftoken`/`sessionid` cookies, so the same client is the authenticated
//! session every worker shares for the rest of the run.

use crate::config::Config;
use crate::crawler::build_http_client;
use crate::{HuntError, Result};
use regex::Regex;
use reqwest::Client;

/// An authenticated crawl session: the client plus the landing page the
/// crawl is seeded from
#[derive(Debug)]
pub struct CrawlSession {
    /// Cookie-carrying HTTP client, safe to share across workers
    pub client: Client,

    /// URL the login redirect landed on
    pub seed_url: String,

    /// Body of the landing page, already fetched
    pub seed_body: String,
}

/// Performs the login handshake and returns an authenticated session
pub async fn login(config: &Config, username: &str, password: &str) -> Result<CrawlSession> {
    let client = build_http_client(config.crawler.request_timeout_secs)?;
    let login_url = config.site.login_url()?;

    // First GET sets the csrftoken cookie and renders the form
    let form_page = client.get(login_url.clone()).send().await?;
    let form_body = form_page.text().await?;
    let csrf_token = extract_csrf_token(&form_body).ok_or(HuntError::CsrfTokenMissing)?;

    let form = [
        ("username", username),
        ("password", password),
        ("csrfmiddlewaretoken", csrf_token.as_str()),
        ("next", config.site.link_prefix.as_str()),
    ];

    // The redirect after a successful POST is followed automatically, so
    // this response is already the landing page
    let response = client.post(login_url.clone()).form(&form).send().await?;
    let seed_url = response.url().to_string();

    // A rejected login re-renders the form at the same URL
    if !response.status().is_success() || seed_url == login_url.as_str() {
        return Err(HuntError::LoginFailed { url: seed_url });
    }

    let seed_body = response.text().await?;
    tracing::info!("Login succeeded, landed on {}", seed_url);

    Ok(CrawlSession {
        client,
        seed_url,
        seed_body,
    })
}

/// Pulls the `csrfmiddlewaretoken` hidden-field value out of the login form
fn extract_csrf_token(body: &str) -> Option<String> {
    let re = Regex::new(r#"name="csrfmiddlewaretoken" value="(.*?)""#)
        .expect("csrf pattern is a valid regex");
    re.captures(body).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(origin: &str) -> Config {
        let mut config = Config::default();
        config.site = SiteConfig {
            origin: origin.to_string(),
            login_path: "/accounts/login/".to_string(),
            link_prefix: "/fakebook/".to_string(),
        };
        config
    }

    const LOGIN_FORM: &str = r#"
        <form method="post">
            <input type="hidden" name="csrfmiddlewaretoken" value="tok123">
            <input name="username"><input name="password" type="password">
        </form>
    "#;

    #[test]
    fn test_extract_csrf_token() {
        assert_eq!(extract_csrf_token(LOGIN_FORM).as_deref(), Some("tok123"));
        assert_eq!(extract_csrf_token("<form></form>"), None);
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FORM))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/accounts/login/"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("csrfmiddlewaretoken=tok123"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", "/fakebook/"),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/fakebook/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>feed</html>"))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let session = login(&config, "alice", "hunter2").await.unwrap();

        assert!(session.seed_url.ends_with("/fakebook/"));
        assert_eq!(session.seed_body, "<html>feed</html>");
    }

    #[tokio::test]
    async fn test_login_rejected_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FORM))
            .mount(&server)
            .await;

        // Bad credentials: the form is re-rendered at the login URL
        Mock::given(method("POST"))
            .and(path("/accounts/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_FORM))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let err = login(&config, "alice", "wrong").await.unwrap_err();
        assert!(matches!(err, HuntError::LoginFailed { .. }));
    }

    #[tokio::test]
    async fn test_login_without_csrf_field() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<form></form>"))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let err = login(&config, "alice", "hunter2").await.unwrap_err();
        assert!(matches!(err, HuntError::CsrfTokenMissing));
    }
}
