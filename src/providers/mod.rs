pub mod backend;
pub mod retry;
pub mod traits;
pub mod yahoo;

pub use backend::HttpArticleSource;
pub use retry::{RetryConfig, RetryingQuoteProvider, with_retry};
pub use traits::{ArticleSource, QuoteProvider};
pub use yahoo::YahooChartProvider;
