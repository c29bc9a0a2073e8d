use blog_common::posts::{
    self, Navigator, PostDraft, RequestFailure, SubmitMethod, SubmitRequest, Trigger, UserId,
    JSON_CONTENT_TYPE,
};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    console, Element, HtmlInputElement, HtmlOptionElement, HtmlSelectElement,
    HtmlTextAreaElement, MouseEvent, Request, RequestCache, RequestInit, Response,
};

use crate::document;

pub const TITLE_FIELD: &str = ".post_title_edit";
pub const RUBRIC_OPTION: &str = ".post_rubric_edit option:checked";
pub const CONTENT_FIELD: &str = ".post_content_edit";
pub const SAVE_EDIT_BUTTON: &str = ".saveeditpost";
pub const SAVE_NEW_BUTTON: &str = ".savenewpost";
pub const POST_ID_ATTRIBUTE: &str = "task-id";

#[derive(Debug)]
pub enum EditorError {
    NoneError,
    DOMError,
    TypeError,
    Submit(posts::Error),
}

impl From<JsValue> for EditorError {
    fn from(_: JsValue) -> Self {
        EditorError::DOMError
    }
}
impl From<posts::Error> for EditorError {
    fn from(err: posts::Error) -> Self {
        EditorError::Submit(err)
    }
}

fn get_elt_value(selector: &str) -> Result<String, EditorError> {
    let elt = document()
        .ok_or(EditorError::NoneError)?
        .query_selector(selector)?
        .ok_or(EditorError::NoneError)?;
    if let Some(input) = elt.dyn_ref::<HtmlInputElement>() {
        Ok(input.value())
    } else if let Some(textarea) = elt.dyn_ref::<HtmlTextAreaElement>() {
        Ok(textarea.value())
    } else if let Some(select) = elt.dyn_ref::<HtmlSelectElement>() {
        Ok(select.value())
    } else if let Some(option) = elt.dyn_ref::<HtmlOptionElement>() {
        Ok(option.value())
    } else {
        Err(EditorError::TypeError)
    }
}

/// Reads the post form as it is right now.
///
/// A rubric select without any option gives an empty rubric.
pub fn read_draft() -> Result<PostDraft, EditorError> {
    let rubric_id = match get_elt_value(RUBRIC_OPTION) {
        Err(EditorError::NoneError) => String::new(),
        rubric => rubric?,
    };
    Ok(PostDraft::new(
        get_elt_value(TITLE_FIELD)?,
        rubric_id,
        get_elt_value(CONTENT_FIELD)?,
    ))
}

/// Author of the post, from the `data-user-id` the page was rendered with.
pub fn session_user() -> UserId {
    UserId::from_session(
        document()
            .and_then(|d| d.body())
            .and_then(|body| body.dataset().get("userId")),
    )
}

pub fn init() -> Result<(), EditorError> {
    bind(SAVE_EDIT_BUTTON, Trigger::SaveEdit)?;
    bind(SAVE_NEW_BUTTON, Trigger::SaveNew)?;
    Ok(())
}

fn bind(selector: &str, trigger: Trigger) -> Result<(), EditorError> {
    let buttons = document()
        .ok_or(EditorError::NoneError)?
        .query_selector_all(selector)?;
    for i in 0..buttons.length() {
        let button = buttons.get(i).ok_or(EditorError::NoneError)?;
        let on_click = Closure::wrap(Box::new(move |evt: MouseEvent| {
            evt.stop_propagation();
            let task_id = evt
                .current_target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|button| button.get_attribute(POST_ID_ATTRIBUTE));
            if let Err(e) = save(trigger, task_id) {
                console::error_1(&format!("Couldn't save the post: {:?}", e).into());
            }
        }) as Box<dyn FnMut(MouseEvent)>);
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }
    Ok(())
}

/// Sends the form to the posts API. The answer is handled later, on
/// another turn of the event loop.
pub fn save(trigger: Trigger, task_id: Option<String>) -> Result<(), EditorError> {
    let draft = read_draft()?;
    let method = SubmitMethod::from_trigger(trigger, task_id)?;
    let request = SubmitRequest::new("", &draft, &session_user(), method);
    spawn_local(async move {
        let result = send(&request).await;
        if let Err(err) = posts::complete(&request, result, &Location) {
            console::error_1(&posts::describe_failure(&request, &err).into());
        }
    });
    Ok(())
}

/// The `fetch` request for a submission, with caching disabled.
pub fn build_request(request: &SubmitRequest) -> Result<Request, RequestFailure> {
    let init = RequestInit::new();
    init.set_method(request.http_method());
    init.set_cache(RequestCache::NoStore);
    init.set_body(&JsValue::from_str(&request.body_json()?));

    let req = Request::new_with_str_and_init(&request.url, &init).map_err(network)?;
    req.headers()
        .set("Content-Type", JSON_CONTENT_TYPE)
        .map_err(network)?;
    Ok(req)
}

async fn send(request: &SubmitRequest) -> Result<String, RequestFailure> {
    let req = build_request(request)?;
    let window =
        web_sys::window().ok_or_else(|| RequestFailure::Network("no window".to_owned()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(network)?;
    let text = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .unwrap_or_default();

    if response.ok() {
        Ok(text)
    } else {
        Err(RequestFailure::from_status(response.status(), &text))
    }
}

fn network(err: JsValue) -> RequestFailure {
    RequestFailure::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// Navigates the current page.
pub struct Location;

impl Navigator for Location {
    fn navigate(&self, location: &str) {
        match web_sys::window().map(|w| w.location().assign(location)) {
            Some(Ok(())) => {}
            Some(Err(e)) => console::error_1(&e),
            None => console::error_1(&"no window to navigate".into()),
        }
    }
}
