/// Output sink the router and responders write to.
///
/// Responders own ordering: header mutation precedes `set_status`, which
/// precedes body writes. Implementations only record what they are given.
pub trait ResponseWriter {
    fn set_status(&mut self, status: u16);
    /// Set a header, replacing any previous value under the same name.
    fn insert_header(&mut self, name: &str, value: &str);
    fn write_body(&mut self, chunk: &[u8]);
}

/// Reason phrase for a status code. Unknown codes fall back to "OK",
/// which HTTP clients ignore anyway.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        410 => "Gone",
        418 => "I'm a teapot",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "OK",
    }
}

/// In-memory response buffer.
///
/// Doubles as the staging area the `may_minihttp` bridge flushes from and
/// as the recorder tests assert against.
pub struct RecordedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Default for RecordedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordedResponse {
    /// Status defaults to 200 until a responder or handler sets one.
    #[must_use]
    pub fn new() -> Self {
        RecordedResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Header lookup by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body decoded as UTF-8, lossily.
    #[must_use]
    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Flush into a `may_minihttp` response. Its `header` call only takes
    /// `'static` lines, so each dynamic header line is leaked; responses
    /// carry a handful of short headers and the server owns the process
    /// lifetime.
    pub fn flush(self, res: &mut may_minihttp::Response) {
        res.status_code(self.status as usize, status_reason(self.status));
        for (name, value) in &self.headers {
            let line: &'static str = Box::leak(format!("{name}: {value}").into_boxed_str());
            res.header(line);
        }
        res.body_vec(self.body);
    }
}

impl ResponseWriter for RecordedResponse {
    fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    fn insert_header(&mut self, name: &str, value: &str) {
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            existing.1 = value.to_string();
        } else {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }
}
