//! User-facing error message formatting.
//!
//! Uses typed error matching (ureq variants, io::ErrorKind) rather than
//! string parsing to produce actionable, implementation-agnostic messages.

use std::io;

/// Format a ureq error as a user-facing message by matching on its variant.
pub fn user_message_from_ureq(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            let text = response.status_text();
            if text.is_empty() {
                format!("Server returned {}. Check the URL.", code)
            } else {
                format!("Server returned {} {}. Check the URL.", code, text)
            }
        }
        ureq::Error::Transport(t) => {
            format!("Could not reach the server: {}. Check the URL and your connection.", t)
        }
    }
}

/// Format a JSON decode error as a user-facing message.
pub fn user_message_from_json(err: &serde_json::Error) -> String {
    format!("The response body is not valid JSON: {}", err)
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error) -> String {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::NotFound => "File not found. Check the path.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        _ => err.to_string(),
    }
}
