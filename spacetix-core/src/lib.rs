pub mod booking;
pub mod calendar;
pub mod registry;
pub mod repository;

pub use booking::{Booking, Customer, LaunchPad, NewBooking};
pub use calendar::{utc_day_window, weekday_name, DayWindow};
pub use registry::{LaunchRegistry, RegistryError, StaticLaunchRegistry};
pub use repository::{BookingRepository, StoreError, StoreResult};
