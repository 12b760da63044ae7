pub mod booking_controller;
pub mod cinema_controller;
pub mod film_controller;
pub mod film_show_controller;
pub mod hall_controller;
pub mod home_controller;
