//! The `http` package — a blocking client over `ureq`.
//!
//! Responses come back as `{status, headers, content, json?}` tables; the
//! `json` entry is present only when the body parses. Non-2xx statuses are
//! ordinary responses, not errors.

use super::{native, table_of};
use crate::value::Table;
use crate::{Shared, TableRef, Value};
use std::cell::RefCell;

fn http_error(error: impl ToString) -> Value {
    Value::error("HTTPError", error.to_string())
}

/// Apply a `headers` table to a request.
fn with_headers(mut request: ureq::Request, headers: Option<TableRef>) -> ureq::Request {
    if let Some(headers) = headers {
        for (key, value) in headers.borrow().iter() {
            request = request.set(&key.to_string(), &value.to_string());
        }
    }
    request
}

/// Turn a response into the `{status, headers, content, json?}` table.
fn response_table(response: ureq::Response, include_json: bool) -> Value {
    let status = response.status();

    let mut headers = Table::new();
    for name in response.headers_names() {
        if let Some(value) = response.header(&name) {
            headers.define(Value::string(name.as_str()), Value::string(value));
        }
    }

    let content = response.into_string().unwrap_or_default();

    let mut out = Table::new();
    out.define(Value::string("status"), Value::Number(f64::from(status)));
    out.define(
        Value::string("headers"),
        Value::Table(Shared::new(RefCell::new(headers))),
    );
    out.define(Value::string("content"), Value::string(content.as_str()));
    if include_json {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&content) {
            out.define(Value::string("json"), Value::from_json(&parsed));
        }
    }
    Value::Table(Shared::new(RefCell::new(out)))
}

/// An error status still carries a response worth returning.
fn complete(result: Result<ureq::Response, ureq::Error>, include_json: bool) -> Value {
    match result {
        Ok(response) => response_table(response, include_json),
        Err(ureq::Error::Status(_, response)) => response_table(response, include_json),
        Err(error) => http_error(error),
    }
}

fn send_json(request: ureq::Request, body: &Value) -> Result<ureq::Response, ureq::Error> {
    let encoded = serde_json::to_string(&body.to_json()).unwrap_or_default();
    request
        .set("Content-Type", "application/json")
        .send_string(&encoded)
}

/// Build the `http` table.
pub(crate) fn package() -> Value {
    table_of([
        (
            "get",
            native(|_, args| {
                let Some(url) = args.string(0) else {
                    return Value::runtime_error("request a non-String url");
                };
                let mut request = ureq::get(&url);
                if let Some(params) = args.table(1) {
                    for (key, value) in params.borrow().iter() {
                        request = request.query(&key.to_string(), &value.to_string());
                    }
                }
                request = with_headers(request, args.table(2));
                complete(request.call(), true)
            }),
        ),
        (
            "post",
            native(|_, args| {
                let Some(url) = args.string(0) else {
                    return Value::runtime_error("request a non-String url");
                };
                let request = with_headers(ureq::post(&url), args.table(2));
                complete(send_json(request, &args.value(1)), true)
            }),
        ),
        (
            "patch",
            native(|_, args| {
                let Some(url) = args.string(0) else {
                    return Value::runtime_error("request a non-String url");
                };
                let request = with_headers(ureq::request("PATCH", &url), args.table(2));
                complete(send_json(request, &args.value(1)), false)
            }),
        ),
    ])
}
