pub mod json_site_store;
pub mod site_store;
