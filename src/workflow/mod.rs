pub mod eval_session;
pub mod request_token;

pub use eval_session::EvalSession;
pub use request_token::RequestToken;
