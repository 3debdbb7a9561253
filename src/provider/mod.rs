pub mod traits;
pub mod yahoo;

pub use traits::PriceSeriesProvider;
pub use yahoo::YahooProvider;
