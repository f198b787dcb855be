//! Client for the external OCR service.
//!
//! The service takes a multipart upload with the image under `file` plus
//! `model` and `lang` form fields, and answers with [`OcrResponse`] JSON.

use std::path::Path;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use reqwest::multipart::{Form, Part};
use tracing::{debug, error, instrument};

use super::{OcrError, OcrResponse, group_ocr_text};
use crate::config::OcrSettings;

/// Default timeout for OCR requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP client for the OCR service
#[derive(Debug, Clone)]
pub struct OcrClient {
    client: ReqwestClient,
    settings: OcrSettings,
}

impl OcrClient {
    /// Create a client. Missing settings are only reported when a request is made.
    pub fn new(settings: OcrSettings) -> Result<Self, OcrError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Upload an image and return the raw detections
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn recognize(&self, file_name: &str, image: Vec<u8>) -> Result<OcrResponse, OcrError> {
        let api_url = self
            .settings
            .api_url
            .as_deref()
            .ok_or(OcrError::MissingConfig("OCR_API_URL"))?;
        let model = self
            .settings
            .model
            .clone()
            .ok_or(OcrError::MissingConfig("OCR_MODEL"))?;

        let mut form = Form::new()
            .part("file", Part::bytes(image).file_name(file_name.to_string()))
            .text("model", model);
        if let Some(lang) = &self.settings.lang {
            form = form.text("lang", lang.clone());
        }

        debug!("Sending image {} to {}", file_name, api_url);
        let response = self.client.post(api_url).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("OCR service error: {} - {}", status, body);
            return Err(OcrError::Api {
                status_code: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse OCR response: {}", e);
            OcrError::UnexpectedResponse(format!("Failed to parse response: {}", e))
        })
    }

    /// Run OCR on an image file and group the detections into lines
    pub async fn ocr_image(&self, path: &Path) -> Result<Vec<String>, OcrError> {
        let image = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let response = self.recognize(&file_name, image).await?;
        Ok(group_ocr_text(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::io::Write;

    fn settings(url: &str) -> OcrSettings {
        OcrSettings {
            api_url: Some(url.to_string()),
            model: Some("ppocr".to_string()),
            lang: Some("vi".to_string()),
        }
    }

    #[tokio::test]
    async fn test_ocr_image_groups_lines() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/ocr")
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="scan.png""#.to_string()),
                Matcher::Regex(r#"name="model""#.to_string()),
                Matcher::Regex("ppocr".to_string()),
                Matcher::Regex(r#"name="lang""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"result": [
                    {"box": [[40, 0], [80, 0], [80, 20], [40, 20]], "text": "world"},
                    {"box": [[0, 2], [35, 2], [35, 22], [0, 22]], "text": "hello"},
                    {"box": [[0, 60], [50, 60], [50, 80], [0, 80]], "text": "next line"}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"fake image bytes")
            .unwrap();

        let client = OcrClient::new(settings(&format!("{}/ocr", server.url()))).unwrap();
        let lines = client.ocr_image(&path).await.unwrap();

        assert_eq!(lines, vec!["hello world", "next line"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_service_error_is_fatal() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/ocr")
            .with_status(500)
            .with_body("model crashed")
            .create_async()
            .await;

        let client = OcrClient::new(settings(&format!("{}/ocr", server.url()))).unwrap();
        let result = client.recognize("a.png", vec![1, 2, 3]).await;

        assert!(matches!(
            result,
            Err(OcrError::Api { status_code: 500, ref message }) if message == "model crashed"
        ));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/ocr")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = OcrClient::new(settings(&format!("{}/ocr", server.url()))).unwrap();
        let result = client.recognize("a.png", vec![0]).await;
        assert!(matches!(result, Err(OcrError::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_missing_settings_reported_at_call_time() {
        let client = OcrClient::new(OcrSettings::default()).unwrap();
        let result = client.recognize("a.png", vec![0]).await;
        assert!(matches!(result, Err(OcrError::MissingConfig("OCR_API_URL"))));

        let client = OcrClient::new(OcrSettings {
            api_url: Some("http://127.0.0.1:9/ocr".to_string()),
            ..OcrSettings::default()
        })
        .unwrap();
        let result = client.recognize("a.png", vec![0]).await;
        assert!(matches!(result, Err(OcrError::MissingConfig("OCR_MODEL"))));
    }

    #[tokio::test]
    async fn test_missing_image_file() {
        let client = OcrClient::new(settings("http://127.0.0.1:9/ocr")).unwrap();
        let result = client.ocr_image(Path::new("/definitely/not/here.png")).await;
        assert!(matches!(result, Err(OcrError::Io(_))));
    }
}
