pub mod error;
pub mod types;

pub use error::{Result, TwitterError};
pub use types::{FollowingPage, FollowingUser};

use serde_json::Value;

/// RapidAPI host serving paginated "following" listings.
const FOLLOWING_HOST: &str = "twitter-api45.p.rapidapi.com";

/// RapidAPI host serving per-account profile attributes.
const ABOUT_HOST: &str = "twitter241.p.rapidapi.com";

/// Raw transport client for the two RapidAPI Twitter endpoints. Returns
/// response bodies as text so callers can memoize the exact wire payload;
/// parsing lives in [`parse_following_page`] and [`extract_profile`].
pub struct TwitterClient {
    client: reqwest::Client,
    api_key: String,
}

impl TwitterClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Fetch one page of accounts followed by `screen_name`.
    /// Pass the `next_cursor` from a prior page to continue listing.
    pub async fn following_page(
        &self,
        screen_name: &str,
        cursor: Option<&str>,
    ) -> Result<String> {
        let url = format!("https://{FOLLOWING_HOST}/following.php");
        let mut params = vec![("screenname", screen_name)];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }

        let resp = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", FOLLOWING_HOST)
            .query(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(screen_name, cursor, "Fetched following page");
        Ok(resp.text().await?)
    }

    /// Fetch profile attributes for a single account.
    pub async fn about_account(&self, screen_name: &str) -> Result<String> {
        let url = format!("https://{ABOUT_HOST}/about-account");

        let resp = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", ABOUT_HOST)
            .query(&[("username", screen_name)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TwitterError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(screen_name, "Fetched account profile");
        Ok(resp.text().await?)
    }
}

/// Parse a following-page body. A page whose `status` is not "ok" failed
/// server-side and is reported as an API error.
pub fn parse_following_page(body: &str) -> Result<FollowingPage> {
    let page: FollowingPage = serde_json::from_str(body)?;
    if !page.is_ok() {
        return Err(TwitterError::Failed(format!(
            "following page status {:?}",
            page.status
        )));
    }
    Ok(page)
}

/// Pull the profile subtree (`result.data.user_result_by_screen_name.result`)
/// out of an about-account body. That subtree carries
/// `about_profile.account_based_in` among much else.
pub fn extract_profile(body: &str) -> Result<Value> {
    let mut envelope: Value = serde_json::from_str(body)?;
    let profile = envelope
        .pointer_mut("/result/data/user_result_by_screen_name/result")
        .map(Value::take)
        .filter(|v| !v.is_null());
    profile.ok_or_else(|| TwitterError::Parse("no profile in about-account response".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn following_page_parses_full_response() {
        let body = json!({
            "status": "ok",
            "following": [
                {"screen_name": "alice", "name": "Alice"},
                {"screen_name": "bob"}
            ],
            "more_users": true,
            "next_cursor": "1234|5678"
        })
        .to_string();

        let page = parse_following_page(&body).unwrap();
        assert_eq!(page.following.len(), 2);
        assert_eq!(page.following[0].screen_name, "alice");
        assert!(page.more_users);
        assert_eq!(page.next_cursor.as_deref(), Some("1234|5678"));
    }

    #[test]
    fn following_page_tolerates_missing_fields() {
        let page: FollowingPage =
            serde_json::from_value(json!({"status": "ok"})).unwrap();
        assert!(page.is_ok());
        assert!(page.following.is_empty());
        assert!(!page.more_users);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn non_ok_page_is_a_reported_failure() {
        let err = parse_following_page(r#"{"status": "error"}"#).unwrap_err();
        assert!(matches!(err, TwitterError::Failed(_)));
    }

    #[test]
    fn extract_profile_walks_envelope() {
        let body = json!({
            "result": {"data": {"user_result_by_screen_name": {"result": {
                "rest_id": "42",
                "about_profile": {"account_based_in": "China"}
            }}}}
        })
        .to_string();

        let profile = extract_profile(&body).unwrap();
        assert_eq!(profile["about_profile"]["account_based_in"], json!("China"));
    }

    #[test]
    fn extract_profile_rejects_malformed_envelope() {
        assert!(extract_profile(r#"{"result": {}}"#).is_err());
        assert!(extract_profile("{}").is_err());
        let null_result = json!({
            "result": {"data": {"user_result_by_screen_name": {"result": null}}}
        })
        .to_string();
        assert!(extract_profile(&null_result).is_err());
    }
}
