// Reference backend implementations

pub mod calendar;
pub mod file;
pub mod memory;
pub mod table;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use table::SettingsTable;
