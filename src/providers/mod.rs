pub mod html;
pub mod http_page;

pub use http_page::HttpPageFetcher;
