use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Body of the start-download request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartJobBody {
    #[serde(rename = "courseName")]
    pub course_name: String,
    #[serde(rename = "selectedFileIds")]
    pub selected_file_ids: Vec<String>,
}

/// Response from the start-download endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartJobResponse {
    pub job_id: String,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Sent verbatim as the `Cookie` header on every request
    pub session_cookie: Option<String>,
    /// Where finished archives are written
    pub download_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            session_cookie: None,
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
