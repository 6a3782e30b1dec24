pub mod booking;
pub mod calendar;
pub mod catalog;
pub mod scheduling;
