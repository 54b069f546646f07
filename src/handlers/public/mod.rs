// Public handlers: no bearer token required.

pub mod billing;
pub mod site;

pub use billing::customer_portal;
pub use site::{health, robots, root, sitemap};
