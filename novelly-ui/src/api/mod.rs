//! Browser HTTP transport
//!
//! Implements the `novelly` transport seam over `fetch` (gloo-net) and keeps
//! the configurable API base in `localStorage`.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use novelly::client::{
    FormPart, HttpRequest, HttpResponse, Method, PartValue, RequestBody, Transport,
    TransportError, DEFAULT_API_BASE,
};
use novelly::models::FileUpload;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

const API_BASE_KEY: &str = "novelly_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_BASE_KEY).ok().flatten())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    url.trim_end_matches('/').to_string()
}

/// Set the API base URL in local storage
pub fn set_api_base(url: &str) {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = storage.set_item(API_BASE_KEY, url);
    }
}

pub struct GlooTransport;

fn js_error(e: JsValue) -> TransportError {
    TransportError::Request(format!("{:?}", e))
}

fn form_data(parts: &[FormPart]) -> Result<web_sys::FormData, TransportError> {
    let form = web_sys::FormData::new().map_err(js_error)?;
    for part in parts {
        match &part.value {
            PartValue::Text(text) => form.append_with_str(&part.name, text).map_err(js_error)?,
            PartValue::File(file) => {
                let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
                let options = web_sys::BlobPropertyBag::new();
                options.set_type(&file.content_type);
                let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(
                    &js_sys::Array::of1(&bytes),
                    &options,
                )
                .map_err(js_error)?;
                form.append_with_blob_and_filename(&part.name, &blob, &file.file_name)
                    .map_err(js_error)?;
            }
        }
    }
    Ok(form)
}

fn builder(method: Method, url: &str) -> RequestBuilder {
    match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
        Method::Put => Request::put(url),
        Method::Delete => Request::delete(url),
    }
}

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = builder(request.method, &request.url);
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }

        let req = match &request.body {
            RequestBody::Empty => req.build(),
            RequestBody::Json(value) => req.body(value.to_string()),
            // The browser sets the multipart boundary itself
            RequestBody::Multipart(parts) => req.body(form_data(parts)?),
        }
        .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = req
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        let content_type = response.headers().get("content-type");
        let body = response
            .binary()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Read a picked file into an upload part
pub async fn read_file(file: &web_sys::File) -> Result<FileUpload, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read {}: {:?}", file.name(), e))?;
    Ok(FileUpload {
        file_name: file.name(),
        content_type: file.type_(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}
