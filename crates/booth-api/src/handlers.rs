//! Request handlers.

pub mod background;
pub mod health;
pub mod objects;
pub mod upload;
pub mod video_chunk;
pub mod visits;

pub use background::current_background;
pub use health::{health, ready};
pub use objects::serve_object;
pub use upload::upload_image;
pub use video_chunk::upload_video_chunk;
pub use visits::record_visit;
