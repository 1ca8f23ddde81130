//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process bus delivering to handlers before
//!   `publish` returns

mod in_memory;

pub use in_memory::InMemoryEventBus;
