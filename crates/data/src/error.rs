/// Failure talking to the locations API.
///
/// `Display` is the message shown in the error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// Non-2xx response. `detail` is the server's own explanation, if it sent one.
    Http { status: u16, detail: Option<String> },
    Transport(String),
    Decode(String),
}

impl DataError {
    pub fn http(status: u16, detail: Option<String>) -> Self {
        DataError::Http { status, detail }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DataError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Http {
                detail: Some(detail),
                ..
            } => f.write_str(detail),
            DataError::Http { status, .. } => write!(f, "HTTP error {status}"),
            DataError::Transport(msg) => write!(f, "request failed: {msg}"),
            DataError::Decode(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for DataError {}

#[cfg(test)]
mod tests {
    use super::DataError;

    #[test]
    fn banner_text_prefers_server_detail() {
        assert_eq!(
            DataError::http(404, Some("Location not found".into())).to_string(),
            "Location not found"
        );
        assert_eq!(DataError::http(502, None).to_string(), "HTTP error 502");
    }
}
