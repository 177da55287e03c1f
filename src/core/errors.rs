use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("WebDriver command error: {0}")]
    WebDriverError(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session error: {0}")]
    SessionError(#[from] fantoccini::error::NewSessionError),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid selector `{selector}`: {reason}")]
    SelectorError { selector: String, reason: String },

    #[error("Navigation to {url} failed: {reason}")]
    NavigationError { url: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type ScraperResult<T> = Result<T, ScraperError>;
