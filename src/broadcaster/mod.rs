pub mod broadcaster;


pub use broadcaster::BroadcastHandle;
pub use broadcaster::Broadcaster;
