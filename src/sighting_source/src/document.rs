/// A fetched page: the raw HTML body plus where it came from.
///
/// The body is kept as text rather than a parsed DOM so the value stays `Send`
/// and cheap to hand across tasks; parsing happens where the table is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// URL that was requested. Parsed reports record this as their source.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    /// Response body.
    pub html: String,
}

impl Document {
    /// Builds a document that did not come over the network (fixtures, stdin).
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            html: html.into(),
        }
    }
}
