pub mod book;
pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use book::SignalBook;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
