use wasm_bindgen::prelude::*;
use web_sys::{console, window, Document};

pub mod editor;

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    extern crate console_error_panic_hook;
    use std::panic;
    panic::set_hook(Box::new(console_error_panic_hook::hook));

    editor::init()
        .map_err(|e| console::error_1(&format!("Editor error: {:?}", e).into()))
        .ok();
    Ok(())
}

fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}
