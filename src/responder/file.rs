use super::Responder;
use crate::router::RequestContext;

/// File-download responder: attachment headers plus raw bytes.
pub struct File {
    pub name: String,
    pub data: Vec<u8>,
    /// Zero means 200.
    pub status: u16,
}

impl File {
    #[must_use]
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        File {
            name: name.into(),
            data,
            status: 0,
        }
    }

    fn code(&self) -> u16 {
        if self.status == 0 {
            200
        } else {
            self.status
        }
    }
}

impl Responder for File {
    fn status_code(&self, _ctx: &RequestContext<'_>) -> u16 {
        self.code()
    }

    fn respond(&self, ctx: &mut RequestContext<'_>) {
        let w = &mut *ctx.writer;
        w.insert_header("Content-Description", "File Transfer");
        w.insert_header("Content-Transfer-Encoding", "binary");
        w.insert_header(
            "Content-Disposition",
            &format!("attachment; filename=\"{}\"", self.name),
        );
        w.insert_header("Content-Type", "application/octet-stream");
        w.insert_header("X-Filename", &self.name);
        w.insert_header("X-Filesize", &self.data.len().to_string());
        w.insert_header("Cache-Control", "no-cache");
        w.set_status(self.code());
        w.write_body(&self.data);
    }
}
