use serde::Deserialize;

/// One page of a "following" listing from the directory API.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowingPage {
    /// "ok" on success; anything else means the page failed server-side.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub following: Vec<FollowingUser>,
    /// Whether further pages exist beyond this one.
    #[serde(default)]
    pub more_users: bool,
    /// Opaque continuation token for the next page.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl FollowingPage {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// A single followed account within a listing page. The API returns many
/// more fields; only the handle matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowingUser {
    #[serde(default)]
    pub screen_name: String,
}
