pub mod session;

pub use session::{make_span_with_request_id, session_middleware, RequestId};
