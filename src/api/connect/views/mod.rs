pub mod error_page;
