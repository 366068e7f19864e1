// Control API: health, polling toggles, result read-out, translation requests
pub mod handler;
pub mod models;
