//! Concrete PostgreSQL repository implementations of the store traits.

pub mod access;
pub mod collection;
pub mod entry;
pub mod space;

pub use access::AccessRecordRepository;
pub use collection::CollectionRepository;
pub use entry::EntryRepository;
pub use space::SpaceRepository;
