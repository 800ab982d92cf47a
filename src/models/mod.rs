pub mod booking;
pub mod event;
pub mod pagination;

pub use booking::{Booking, CreateBookingRequest};
pub use event::{AdminEvent, Event, EventDetail, EventMode, EventPatch, NewEvent};
pub use pagination::{PageMeta, PageQuery, Pagination};
