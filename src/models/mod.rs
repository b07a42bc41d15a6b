mod feed_item;
mod refresh;

pub use feed_item::{Comment, FeedItem};
pub use refresh::RefreshRecord;
