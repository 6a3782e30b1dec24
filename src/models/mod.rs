pub mod availability;
pub mod booking;
pub mod fields;
pub mod profile;
pub mod service;

pub use availability::{BusinessHours, Interval};
pub use booking::{Booking, BookingFilter, BookingPatch, BookingStatus, NewBooking};
pub use profile::{Profile, ProfileUpdate};
pub use service::{NewService, Service, ServicePatch};
