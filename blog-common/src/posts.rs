use blog_api::{
    posts::{post_page, ErrorResponse, NewPostData, StatusResponse, ANONYMOUS_USER_ID},
    Endpoint,
};
use std::fmt;
use tracing::{debug, error, info};

/// Content type of every body sent to the posts API.
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl ToString) -> PostId {
        PostId(id.to_string())
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author sent along with a post.
///
/// Whoever builds the submission is responsible for providing it, usually
/// from a session. Without one, posts are written by the anonymous user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl ToString) -> UserId {
        UserId(id.to_string())
    }

    pub fn anonymous() -> UserId {
        UserId(ANONYMOUS_USER_ID.to_owned())
    }

    /// Uses the id given by a session, if it has a non-blank one.
    pub fn from_session(id: Option<String>) -> UserId {
        id.map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .map(UserId)
            .unwrap_or_else(UserId::anonymous)
    }
}

impl Default for UserId {
    fn default() -> Self {
        UserId::anonymous()
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Form values of a post, read right before submitting it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub rubric_id: String,
    pub content: String,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        rubric_id: impl Into<String>,
        content: impl Into<String>,
    ) -> PostDraft {
        PostDraft {
            title: title.into(),
            rubric_id: rubric_id.into(),
            content: content.into(),
        }
    }

    pub fn to_data(&self, user: &UserId) -> NewPostData {
        NewPostData {
            title: self.title.clone(),
            content: self.content.clone(),
            user_id: user.as_ref().to_owned(),
            rubric_id: self.rubric_id.clone(),
        }
    }
}

/// The two save buttons of the post forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// `.savenewpost`, on the new post form
    SaveNew,
    /// `.saveeditpost`, on the edit form
    SaveEdit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitMethod {
    Create,
    Update(PostId),
}

impl SubmitMethod {
    /// Picks the method for a trigger. The `task-id` of the clicked element
    /// is only meaningful when editing.
    pub fn from_trigger(trigger: Trigger, task_id: Option<String>) -> Result<SubmitMethod, Error> {
        match trigger {
            Trigger::SaveNew => Ok(SubmitMethod::Create),
            Trigger::SaveEdit => task_id
                .filter(|id| !id.is_empty())
                .map(|id| SubmitMethod::Update(PostId(id)))
                .ok_or(Error::MissingPostId),
        }
    }

    pub fn http_method(&self) -> &'static str {
        match self {
            SubmitMethod::Create => "POST",
            SubmitMethod::Update(_) => "PUT",
        }
    }

    /// API path the request goes to.
    pub fn path(&self) -> String {
        match self {
            SubmitMethod::Create => NewPostData::endpoint().to_owned(),
            SubmitMethod::Update(id) => NewPostData::record(&id.0),
        }
    }
}

/// A fully resolved request to the posts API.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRequest {
    pub method: SubmitMethod,
    pub url: String,
    pub body: NewPostData,
}

impl SubmitRequest {
    /// `origin` is prepended to the API path: empty for same-origin requests
    /// in a browser, `http://host:port` elsewhere.
    pub fn new(origin: &str, draft: &PostDraft, user: &UserId, method: SubmitMethod) -> SubmitRequest {
        SubmitRequest {
            url: format!("{}{}", origin.trim_end_matches('/'), method.path()),
            body: draft.to_data(user),
            method,
        }
    }

    pub fn http_method(&self) -> &'static str {
        self.method.http_method()
    }

    pub fn body_json(&self) -> Result<String, RequestFailure> {
        serde_json::to_string(&self.body).map_err(|e| RequestFailure::Decode(e.to_string()))
    }
}

impl fmt::Display for SubmitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.http_method(), self.url)
    }
}

/// Why a request did not give a usable answer.
///
/// `Display` renders it as `<status>; <error>`.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestFailure {
    Network(String),
    Status {
        code: u16,
        status: Option<String>,
        error: Option<String>,
    },
    Decode(String),
    InvalidUrl(String),
}

impl RequestFailure {
    /// Builds the failure of a non-2xx answer, reading the API error body
    /// when there is one.
    pub fn from_status(code: u16, body: &str) -> RequestFailure {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(res) => RequestFailure::Status {
                code,
                status: res.status,
                error: res.error,
            },
            Err(_) => {
                let body = body.trim();
                RequestFailure::Status {
                    code,
                    status: None,
                    error: if body.is_empty() {
                        None
                    } else {
                        Some(body.to_owned())
                    },
                }
            }
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::Network(e) => write!(f, "error; {}", e),
            RequestFailure::Status {
                code,
                status,
                error,
            } => write!(
                f,
                "{} {}; {}",
                code,
                status.as_deref().unwrap_or_default(),
                error.as_deref().unwrap_or_default()
            ),
            RequestFailure::Decode(e) => write!(f, "parsererror; {}", e),
            RequestFailure::InvalidUrl(e) => write!(f, "error; invalid url {}", e),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Request(RequestFailure),
    /// The edit button carries no `task-id`.
    MissingPostId,
    /// A creation succeeded but `message` holds no id to go to.
    MissingIdentifier,
}

impl From<RequestFailure> for Error {
    fn from(err: RequestFailure) -> Self {
        Error::Request(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Request(e) => e.fmt(f),
            Error::MissingPostId => f.write_str("error; the edit button has no task-id"),
            Error::MissingIdentifier => f.write_str("parsererror; no post id in the response message"),
        }
    }
}

/// Sends a request to the posts API, returning the body of a 2xx answer.
pub trait Transport {
    fn send(&self, request: &SubmitRequest) -> Result<String, RequestFailure>;
}

/// Where to go once a post is saved.
pub trait Navigator {
    fn navigate(&self, location: &str);
}

/// Page to show after a successful save.
///
/// Updates go back to the edited post whatever the answer says. Creations
/// trust `message` to be the id of the new post.
pub fn location_for(method: &SubmitMethod, body: &str) -> Result<String, Error> {
    match method {
        SubmitMethod::Update(id) => Ok(post_page(id.as_ref())),
        SubmitMethod::Create => {
            let res: StatusResponse =
                serde_json::from_str(body).map_err(|e| RequestFailure::Decode(e.to_string()))?;
            let id = res.message.trim();
            if id.is_empty() {
                Err(Error::MissingIdentifier)
            } else {
                Ok(post_page(id))
            }
        }
    }
}

/// Handles the answer to `request`: navigates on success, logs otherwise.
///
/// Nothing else happens on failure, the form is left as it was.
pub fn complete<N: Navigator + ?Sized>(
    request: &SubmitRequest,
    result: Result<String, RequestFailure>,
    navigator: &N,
) -> Result<String, Error> {
    match result
        .map_err(Error::from)
        .and_then(|body| location_for(&request.method, &body))
    {
        Ok(location) => {
            info!("{} saved, going to {}", request, location);
            navigator.navigate(&location);
            Ok(location)
        }
        Err(err) => {
            error!("{}", describe_failure(request, &err));
            Err(err)
        }
    }
}

/// `<request>; <status>; <error>`, the line written to the console when a
/// save fails.
pub fn describe_failure(request: &SubmitRequest, err: &Error) -> String {
    format!("{}; {}", request, err)
}

/// Saves drafts through a transport and follows up with a navigator.
pub struct Submitter<T, N> {
    origin: String,
    user: UserId,
    transport: T,
    navigator: N,
}

impl<T: Transport, N: Navigator> Submitter<T, N> {
    pub fn new(origin: impl Into<String>, user: UserId, transport: T, navigator: N) -> Self {
        Submitter {
            origin: origin.into(),
            user,
            transport,
            navigator,
        }
    }

    pub fn request(&self, draft: &PostDraft, method: SubmitMethod) -> SubmitRequest {
        SubmitRequest::new(&self.origin, draft, &self.user, method)
    }

    pub fn submit(&self, draft: &PostDraft, method: SubmitMethod) -> Result<String, Error> {
        let request = self.request(draft, method);
        debug!("sending {}", request);
        let result = self.transport.send(&request);
        complete(&request, result, &self.navigator)
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;
    use std::cell::RefCell;

    struct CannedTransport {
        answer: Result<String, RequestFailure>,
        sent: RefCell<Vec<SubmitRequest>>,
    }

    impl CannedTransport {
        fn answering(answer: Result<&str, RequestFailure>) -> Self {
            CannedTransport {
                answer: answer.map(str::to_owned),
                sent: RefCell::new(vec![]),
            }
        }
    }

    impl Transport for CannedTransport {
        fn send(&self, request: &SubmitRequest) -> Result<String, RequestFailure> {
            self.sent.borrow_mut().push(request.clone());
            self.answer.clone()
        }
    }

    #[derive(Default)]
    struct History(RefCell<Vec<String>>);

    impl Navigator for History {
        fn navigate(&self, location: &str) {
            self.0.borrow_mut().push(location.to_owned());
        }
    }

    fn draft() -> PostDraft {
        PostDraft::new("T", "5", "C")
    }

    #[test]
    fn create_request() {
        let req = SubmitRequest::new("", &draft(), &UserId::anonymous(), SubmitMethod::Create);
        assert_eq!(req.http_method(), "POST");
        assert_eq!(req.url, "/api/v1/posts");
        assert_json_eq!(
            serde_json::to_value(&req.body).unwrap(),
            json!({
                "title": "T",
                "content": "C",
                "user_id": "00000000-0000-0000-00000000",
                "rubric_id": "5",
            })
        );
        assert_eq!(req.to_string(), "POST /api/v1/posts");
    }

    #[test]
    fn update_request() {
        let req = SubmitRequest::new(
            "",
            &draft(),
            &UserId::anonymous(),
            SubmitMethod::Update(PostId::new(42)),
        );
        assert_eq!(req.http_method(), "PUT");
        assert_eq!(req.url, "/api/v1/posts/42");
        assert_json_eq!(
            serde_json::from_str::<serde_json::Value>(&req.body_json().unwrap()).unwrap(),
            json!({
                "title": "T",
                "content": "C",
                "user_id": "00000000-0000-0000-00000000",
                "rubric_id": "5",
            })
        );
    }

    #[test]
    fn origin_is_prepended() {
        let req = SubmitRequest::new(
            "http://localhost:8888/",
            &draft(),
            &UserId::new("u-1"),
            SubmitMethod::Create,
        );
        assert_eq!(req.url, "http://localhost:8888/api/v1/posts");
        assert_eq!(req.body.user_id, "u-1");
    }

    #[test]
    fn method_from_trigger() {
        assert_eq!(
            SubmitMethod::from_trigger(Trigger::SaveNew, Some("7".into())),
            Ok(SubmitMethod::Create)
        );
        assert_eq!(
            SubmitMethod::from_trigger(Trigger::SaveNew, None),
            Ok(SubmitMethod::Create)
        );
        assert_eq!(
            SubmitMethod::from_trigger(Trigger::SaveEdit, Some("7".into())),
            Ok(SubmitMethod::Update(PostId::new("7")))
        );
        assert_eq!(
            SubmitMethod::from_trigger(Trigger::SaveEdit, Some(String::new())),
            Err(Error::MissingPostId)
        );
        assert_eq!(
            SubmitMethod::from_trigger(Trigger::SaveEdit, None),
            Err(Error::MissingPostId)
        );
    }

    #[test]
    fn user_from_session() {
        assert_eq!(UserId::from_session(None), UserId::anonymous());
        assert_eq!(UserId::from_session(Some("  ".into())), UserId::anonymous());
        assert_eq!(UserId::from_session(Some("abc".into())), UserId::new("abc"));
        assert_eq!(UserId::default().as_ref(), ANONYMOUS_USER_ID);
    }

    #[test]
    fn created_post_location() {
        assert_eq!(
            location_for(&SubmitMethod::Create, r#"{"message":"99"}"#),
            Ok("/posts/99".to_owned())
        );
        assert_eq!(
            location_for(&SubmitMethod::Create, r#"{"message":""}"#),
            Err(Error::MissingIdentifier)
        );
        assert!(matches!(
            location_for(&SubmitMethod::Create, "<html>"),
            Err(Error::Request(RequestFailure::Decode(_)))
        ));
    }

    #[test]
    fn updated_post_location_ignores_body() {
        let update = SubmitMethod::Update(PostId::new("42"));
        assert_eq!(location_for(&update, r#"{"message":"1"}"#), Ok("/posts/42".to_owned()));
        assert_eq!(location_for(&update, "not json"), Ok("/posts/42".to_owned()));
        assert_eq!(location_for(&update, ""), Ok("/posts/42".to_owned()));
    }

    #[test]
    fn submit_create_navigates_to_new_post() {
        let submitter = Submitter::new(
            "",
            UserId::anonymous(),
            CannedTransport::answering(Ok(r#"{"message":"99","httpcode":201,"status":"Created"}"#)),
            History::default(),
        );
        assert_eq!(
            submitter.submit(&draft(), SubmitMethod::Create),
            Ok("/posts/99".to_owned())
        );
        assert_eq!(*submitter.navigator().0.borrow(), vec!["/posts/99".to_owned()]);

        let sent = submitter.transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_string(), "POST /api/v1/posts");
    }

    #[test]
    fn submit_update_navigates_to_edited_post() {
        let submitter = Submitter::new(
            "",
            UserId::anonymous(),
            CannedTransport::answering(Ok("")),
            History::default(),
        );
        let method = SubmitMethod::from_trigger(Trigger::SaveEdit, Some("42".into())).unwrap();
        assert_eq!(submitter.submit(&draft(), method), Ok("/posts/42".to_owned()));
        assert_eq!(*submitter.navigator().0.borrow(), vec!["/posts/42".to_owned()]);
        assert_eq!(
            submitter.transport.sent.borrow()[0].to_string(),
            "PUT /api/v1/posts/42"
        );
    }

    #[test]
    fn failure_does_not_navigate() {
        let failure = RequestFailure::from_status(
            500,
            r#"{"status":"Internal server error.","error":"boom"}"#,
        );
        let submitter = Submitter::new(
            "",
            UserId::anonymous(),
            CannedTransport::answering(Err(failure.clone())),
            History::default(),
        );
        let draft = draft();
        let res = submitter.submit(&draft, SubmitMethod::Create);
        assert_eq!(res, Err(Error::Request(failure)));
        assert!(submitter.navigator().0.borrow().is_empty());
        assert_eq!(draft, PostDraft::new("T", "5", "C"));

        let network = Submitter::new(
            "",
            UserId::anonymous(),
            CannedTransport::answering(Err(RequestFailure::Network("connection refused".into()))),
            History::default(),
        );
        assert!(network
            .submit(&draft, SubmitMethod::Update(PostId::new("42")))
            .is_err());
        assert!(network.navigator().0.borrow().is_empty());
    }

    #[test]
    fn failure_description() {
        let req = SubmitRequest::new(
            "",
            &draft(),
            &UserId::anonymous(),
            SubmitMethod::Update(PostId::new("42")),
        );
        let err = Error::from(RequestFailure::from_status(
            500,
            r#"{"status":"Internal server error.","error":"post with id=42 not found"}"#,
        ));
        assert_eq!(
            describe_failure(&req, &err),
            "PUT /api/v1/posts/42; 500 Internal server error.; post with id=42 not found"
        );

        let plain = RequestFailure::from_status(502, "Bad Gateway\n");
        assert_eq!(plain.to_string(), "502 ; Bad Gateway");
        assert_eq!(RequestFailure::from_status(404, "").to_string(), "404 ; ");

        let garbled = location_for(&SubmitMethod::Create, "<html>").unwrap_err();
        assert!(describe_failure(&req, &garbled).starts_with("PUT /api/v1/posts/42; parsererror; "));
    }
}
