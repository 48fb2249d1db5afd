pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn init() -> LogCtx<ops::init::Init> { LogCtx::new(config::logs_are_json()) }
pub fn content() -> LogCtx<ops::content::Content> { LogCtx::new(config::logs_are_json()) }
pub fn serve() -> LogCtx<ops::serve::Serve> { LogCtx::new(config::logs_are_json()) }
