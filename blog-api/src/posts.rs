use crate::Endpoint;

/// User id sent when no session provides one.
pub const ANONYMOUS_USER_ID: &str = "00000000-0000-0000-00000000";

/// Prefix of the human-facing page of a post.
pub const POST_PAGE: &str = "/posts";

/// Body of both `POST /api/v1/posts` and `PUT /api/v1/posts/<id>`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPostData {
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub rubric_id: String,
}

api!("/api/v1/posts" => NewPostData);

/// Successful answer of the posts API.
///
/// On creation `message` holds the id of the new post, on update it echoes
/// the id that was sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub httpcode: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of a non-2xx answer. Every field is optional since proxies and
/// middlewares may answer with something else entirely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Page of a single post, where the browser lands after saving it.
pub fn post_page(id: &str) -> String {
    format!("{}/{}", POST_PAGE, id)
}
