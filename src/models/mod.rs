pub mod media_type;
pub mod response;
pub mod upload;

pub use media_type::MediaType;
pub use response::*;
pub use upload::*;
