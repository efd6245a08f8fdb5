pub mod location;
pub mod openweather;
pub mod weather;
