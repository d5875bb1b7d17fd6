mod client;
pub mod price_source;
pub mod spot_hinta;
