use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "tabview")]
pub struct Args {
    /// JSON file path or HTTP(S) URL with the row data
    pub source: String,

    /// Dotted path to the row list inside the response body (e.g. "result.items")
    #[arg(long = "data-path")]
    pub data_path: Option<String>,

    /// Extra request header for remote sources ("Name: value"), repeatable
    #[arg(long = "header")]
    pub header: Vec<String>,

    /// Rows per page
    #[arg(long = "per-page")]
    pub per_page: Option<usize>,

    /// Initial page number (1-based)
    #[arg(long = "page")]
    pub page: Option<usize>,

    /// Initial search query
    #[arg(long = "search")]
    pub search: Option<String>,

    /// Request timeout in seconds for remote sources
    #[arg(long = "timeout", default_value_t = 30)]
    pub timeout: u64,
}

/// Split a "Name: value" header argument. Returns None when there is no colon
/// or the name is empty.
pub fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
