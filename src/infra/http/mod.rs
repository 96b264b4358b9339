mod forms;
mod middleware;
mod public;

pub use public::{HttpState, build_router};
