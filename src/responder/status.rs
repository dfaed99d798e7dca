use super::Responder;
use crate::router::RequestContext;

/// Status-only responder: a status line and an empty body.
pub struct Status(pub u16);

impl Responder for Status {
    fn status_code(&self, _ctx: &RequestContext<'_>) -> u16 {
        self.0
    }

    fn respond(&self, ctx: &mut RequestContext<'_>) {
        ctx.writer.set_status(self.0);
    }
}
