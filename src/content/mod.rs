//! Content module - documents, posts, rich text and reading time

mod document;
mod post;
pub mod reading_time;
pub mod rich_text;

pub use document::{ApiPage, Document};
pub use post::{
    Banner, ContentSection, PostData, PostDetail, PostNavigation, PostPage, PostSummary,
    SiblingRef, SummaryData,
};
pub use reading_time::{reading_time, ReadingTime};
pub use rich_text::RichText;
