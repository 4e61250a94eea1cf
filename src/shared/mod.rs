pub mod macros;
pub mod structs;

pub use structs::CarSnapshot;
pub use structs::Direction;
pub use structs::Position;
pub use structs::RequestId;
pub use structs::StateFrame;
