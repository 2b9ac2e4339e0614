mod registry;

pub use registry::InMemoryRoomRegistry;
