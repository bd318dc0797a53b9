//! Configuration module

mod site;

pub use site::ApiConfig;
pub use site::CommentsConfig;
pub use site::ListingConfig;
pub use site::PostConfig;
pub use site::PreviewConfig;
pub use site::SiteConfig;
pub use site::ACCESS_TOKEN_ENV;
