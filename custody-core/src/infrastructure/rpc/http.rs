use crate::foundation::CustodyError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub fn build_client(timeout: Duration) -> Result<Client, CustodyError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| CustodyError::ConfigError(format!("http client build failed: {err}")))
}

pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

pub async fn get_json<R: DeserializeOwned>(client: &Client, url: &str) -> Result<R, CustodyError> {
    let resp = client.get(url).send().await.map_err(|err| CustodyError::upstream(url, transport_details(&err)))?;
    read_json(url, resp).await
}

pub async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(client: &Client, url: &str, payload: &T) -> Result<R, CustodyError> {
    let resp = client.post(url).json(payload).send().await.map_err(|err| CustodyError::upstream(url, transport_details(&err)))?;
    read_json(url, resp).await
}

async fn read_json<R: DeserializeOwned>(url: &str, resp: reqwest::Response) -> Result<R, CustodyError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|err| CustodyError::upstream(url, format!("body read failed: {err}")))?;
    if !status.is_success() {
        return Err(CustodyError::upstream(url, format!("http_status={status} body={}", truncate(&body))));
    }
    serde_json::from_str(&body).map_err(|err| CustodyError::upstream(url, format!("invalid json: {err} body={}", truncate(&body))))
}

fn transport_details(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    }
}

fn truncate(body: &str) -> &str {
    const MAX: usize = 256;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
