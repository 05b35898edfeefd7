pub mod handler;

pub use handler::{create_info_router, get_info, root};
