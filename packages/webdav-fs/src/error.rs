#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("{operation} is only available on directories (href: {href})")]
    NotADirectory {
        operation: &'static str,
        href: String,
    },

    #[error("No such directory: {url}")]
    NoSuchDirectory { url: String },

    #[error("{method} {url} returned status {status}")]
    UnexpectedStatus {
        method: String,
        url: String,
        status: u16,
    },

    #[error("Request handle was already consumed")]
    HandleConsumed,
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
        }
    }
}
