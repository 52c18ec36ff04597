mod call_async;
mod call_config;
mod call_error;
mod call_result;
mod call_struct;
mod send_failure;

pub use call_config::CallConfig;
pub use call_error::CallError;
pub use call_result::CallResult;
pub use call_struct::Call;
pub use send_failure::{SendFailure, SendFailureHandler};
