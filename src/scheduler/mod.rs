pub mod floor_index;
pub mod stop_scheduler;

#[cfg(test)]
mod stop_scheduler_tests;

pub use floor_index::FloorIndex;
pub use stop_scheduler::Classified;
pub use stop_scheduler::Stop;
pub use stop_scheduler::StopClass;
pub use stop_scheduler::StopScheduler;
