pub mod email;
pub mod notify;
pub mod phone;
pub mod sitemap;
