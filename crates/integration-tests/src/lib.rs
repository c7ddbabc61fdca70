//! End-to-end tests for Catalog.
//!
//! The tests drive a running `catalog-web` over HTTP, one cookie jar per
//! simulated user, and are ignored by default.
//!
//! # Running Tests
//!
//! ```bash
//! catalog-cli migrate
//! catalog-web &
//! CATALOG_TEST_URL=http://localhost:5000 cargo test -p catalog-integration-tests -- --ignored
//! ```

use reqwest::{Client, Response, StatusCode, header::LOCATION, redirect::Policy};

/// Server under test when `CATALOG_TEST_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Errors from the test helpers.
pub type Result<T> = std::result::Result<T, reqwest::Error>;

/// One browser-like user: its own cookie jar, redirects not followed.
pub struct TestUser {
    client: Client,
    base_url: String,
    pub username: String,
    pub password: String,
}

impl TestUser {
    /// A user with a unique name so repeated runs never collide.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(prefix: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: std::env::var("CATALOG_TEST_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
            username: format!("{prefix}-{}", uuid::Uuid::new_v4().simple()),
            password: password.to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// `GET` a page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.client.get(self.url(path)).send().await
    }

    /// `POST` a form.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        self.client.post(self.url(path)).form(form).send().await
    }

    /// Submit the registration form with this user's credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn register(&self) -> Result<Response> {
        self.post(
            "/register",
            &[("username", &self.username), ("password", &self.password)],
        )
        .await
    }

    /// Submit the login form with the given password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn login_with(&self, password: &str) -> Result<Response> {
        self.post(
            "/login",
            &[("username", &self.username), ("password", password)],
        )
        .await
    }

    /// Register and log in.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    pub async fn sign_up(&self) -> Result<()> {
        self.register().await?;
        self.login_with(&self.password).await?;
        Ok(())
    }

    /// Create a product and return its id as shown in the listing.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails.
    pub async fn add_product(&self, name: &str, price: &str) -> Result<Option<i32>> {
        let before = product_ids(&self.listing().await?);
        self.post("/add_product", &[("name", name), ("price", price)])
            .await?;
        let after = product_ids(&self.listing().await?);

        Ok(after.into_iter().find(|id| !before.contains(id)))
    }

    /// Body of the product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn listing(&self) -> Result<String> {
        self.get("/").await?.text().await
    }
}

/// Whether `response` is a 303 redirect to `path`.
#[must_use]
pub fn redirects_to(response: &Response, path: &str) -> bool {
    response.status() == StatusCode::SEE_OTHER
        && response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            == Some(path)
}

/// Product ids linked from a listing page, in page order.
#[must_use]
pub fn product_ids(listing: &str) -> Vec<i32> {
    const MARKER: &str = "href=\"/edit_product/";

    listing
        .match_indices(MARKER)
        .filter_map(|(start, _)| {
            let rest = listing.get(start + MARKER.len()..)?;
            let end = rest.find('"')?;
            rest.get(..end)?.parse().ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_ids_from_listing() {
        let html = r#"<td><a href="/edit_product/7">Edit</a></td>
            <td><a href="/edit_product/12">Edit</a></td>"#;
        assert_eq!(product_ids(html), vec![7, 12]);
        assert!(product_ids("<p>none</p>").is_empty());
    }
}
