use anyhow::{Context, Error, Result};
use log::debug;

use crate::constants::*;
use crate::structs::*;

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub api_key: String,
    pub base_url: String,
}

impl ClientOptions {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Read the API key from `VENICE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(API_KEY_ENV)
    }

    /// Read the API key from `name`. A missing or empty variable is an error.
    pub fn from_env_var(name: &str) -> Result<Self> {
        match std::env::var(name) {
            Ok(api_key) if !api_key.trim().is_empty() => Ok(Self::with_api_key(api_key)),
            _ => Err(Error::msg(format!(
                "{} environment variable is required",
                name
            ))),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    pub http_client: reqwest::Client,
    pub api_root: String,
}

impl Client {
    /// Create a new client
    ///
    /// No request is sent until a method is called.
    ///
    /// # Errors
    ///
    /// If the API key is not a valid header value or the HTTP client cannot
    /// be built
    ///
    /// # Example
    ///
    /// ```no_run
    /// use venice_image::{Client, ClientOptions, GenerateRequest};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let client = Client::new(ClientOptions::from_env().unwrap()).unwrap();
    ///     let res = client
    ///         .generate(&GenerateRequest::new("A cute crab in gradient colors"))
    ///         .await
    ///         .unwrap();
    ///     println!("{:?}", res.id);
    /// }
    /// ```
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut auth: reqwest::header::HeaderValue =
            format!("Bearer {}", options.api_key.trim()).parse()?;
        auth.set_sensitive(true);

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(reqwest::header::HeaderMap::from_iter(vec![(
                reqwest::header::AUTHORIZATION,
                auth,
            )]))
            .build()?;

        Ok(Self {
            http_client,
            api_root: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The raw `/models` payload for image models.
    pub async fn list_models_raw(&self) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.api_root, MODELS_URL);
        debug!("GET {}?type={}", url, MODEL_TYPE_IMAGE);
        let res = self
            .http_client
            .get(&url)
            .query(&[("type", MODEL_TYPE_IMAGE)])
            .send()
            .await
            .context(MODELS_ERROR_MSG)?;
        let res = check_status(res, MODELS_ERROR_MSG).await?;
        let value = res
            .json::<serde_json::Value>()
            .await
            .context(MODELS_ERROR_MSG)?;
        Ok(value)
    }

    pub async fn list_models(&self) -> Result<ModelList> {
        let value = self.list_models_raw().await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/{}", self.api_root, GENERATE_URL);
        debug!(
            "POST {} model={} format={} size={:?}x{:?}",
            url, request.model, request.format, request.width, request.height
        );
        let res = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .context(GENERATE_ERROR_MSG)?;
        let res = check_status(res, GENERATE_ERROR_MSG).await?;
        let res = res
            .json::<GenerateResponse>()
            .await
            .context(GENERATE_ERROR_MSG)?;
        debug!("Generated {:?} with {} image(s)", res.id, res.images.len());
        Ok(res)
    }
}

/// Turn a non-success response into an error that carries the API's own
/// message, pretty-printed when it is JSON.
async fn check_status(res: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!("Could not read {} error body: {}", status, err);
            String::new()
        }
    };
    let detail = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or(body),
        Err(_) => body,
    };
    Err(Error::msg(format!(
        "{}: HTTP {}\nAPI Error: {}",
        what, status, detail
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Write;

    fn client(url: &str) -> Client {
        Client::new(ClientOptions::with_api_key("test-key").with_base_url(url)).unwrap()
    }

    #[test]
    fn test_missing_api_key() {
        let err = ClientOptions::from_env_var("VENICE_IMAGE_TEST_UNSET_KEY").unwrap_err();
        assert_eq!(
            err.to_string(),
            "VENICE_IMAGE_TEST_UNSET_KEY environment variable is required"
        );
    }

    #[test]
    fn test_empty_api_key() {
        std::env::set_var("VENICE_IMAGE_TEST_EMPTY_KEY", "  ");
        assert!(ClientOptions::from_env_var("VENICE_IMAGE_TEST_EMPTY_KEY").is_err());
    }

    #[test]
    fn test_api_key_from_env() {
        std::env::set_var("VENICE_IMAGE_TEST_SET_KEY", "secret");
        let options = ClientOptions::from_env_var("VENICE_IMAGE_TEST_SET_KEY").unwrap();
        assert_eq!(options.api_key, "secret");
        assert_eq!(options.base_url, BASE_URL);
    }

    #[tokio::test]
    async fn test_generate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/image/generate")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::Json(serde_json::json!({
                "model": "venice-sd35",
                "prompt": "a lighthouse",
                "format": "jpeg",
                "hide_watermark": true,
                "safe_mode": false,
                "return_binary": false,
                "width": 1280,
                "height": 720,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"gen-42","images":["AAAA"],"timing":{"total":1234}}"#)
            .create_async()
            .await;

        let request =
            GenerateRequest::new("a lighthouse").with_dimensions(Some(1280), Some(720));
        let res = client(&server.url()).generate(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.id.as_deref(), Some("gen-42"));
        assert_eq!(res.images, vec!["AAAA".to_string()]);
        assert_eq!(res.timing.unwrap().total, Some(1234.0));
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/image/generate")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Invalid model"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .generate(&GenerateRequest::new("x").with_model("nope"))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.starts_with(GENERATE_ERROR_MSG), "{}", err);
        assert!(err.contains("400"), "{}", err);
        assert!(err.contains("Invalid model"), "{}", err);
    }

    #[tokio::test]
    async fn test_generate_error_with_broken_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/image/generate")
            .with_status(500)
            .with_chunked_body(|w| {
                w.write_all(b"partial")?;
                Err(std::io::Error::other("connection cut"))
            })
            .create_async()
            .await;

        let err = client(&server.url())
            .generate(&GenerateRequest::new("x"))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.starts_with(GENERATE_ERROR_MSG), "{}", err);
        assert!(err.contains("500"), "{}", err);
    }

    #[tokio::test]
    async fn test_list_models() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/models")
            .match_query(Matcher::UrlEncoded("type".into(), "image".into()))
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"object":"list","data":[{"id":"flux-dev","model_spec":{"traits":["highest_quality"]}}]}"#,
            )
            .create_async()
            .await;

        let client = client(&server.url());
        let models = client.list_models().await.unwrap();
        mock.assert_async().await;
        assert_eq!(models.data.len(), 1);
        assert_eq!(models.data[0].summary(), "flux-dev (highest_quality)");
    }

    #[tokio::test]
    async fn test_list_models_raw_keeps_payload() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"object":"list","data":[]}"#)
            .create_async()
            .await;

        let raw = client(&server.url()).list_models_raw().await.unwrap();
        assert_eq!(raw["object"], "list");
    }

    #[tokio::test]
    async fn test_list_models_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let err = client(&server.url())
            .list_models()
            .await
            .unwrap_err()
            .to_string();
        assert!(err.starts_with(MODELS_ERROR_MSG), "{}", err);
        assert!(err.contains("unauthorized"), "{}", err);
    }
}
