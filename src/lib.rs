// Library exports for the server binary, the generator binary and integration tests

pub mod config;
pub mod i18n;
pub mod icons;
pub mod layout;
pub mod markdown;
pub mod mdx;
pub mod middleware;
pub mod openapi;
pub mod search;
pub mod server;
pub mod source;
pub mod switcher;
