pub mod schedule;
pub mod store;

pub use schedule::ScheduleService;
pub use store::{InMemoryScheduleStore, ScheduleStore, SupabaseScheduleStore};
