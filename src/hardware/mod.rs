pub mod debouncer;
pub mod gpio_button;
pub mod gpio_led;
pub mod shared;
pub mod traits;
