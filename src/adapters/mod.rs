//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements     | Connects to                    |
//! |--------------|----------------|--------------------------------|
//! | `memory`     | PetRepository  | in-process postcard blob map   |
//! | `json_store` | PetRepository  | one JSON file, atomic rename   |
//! | `save_queue` | SavePort       | per-session writer thread      |
//! | `log_sink`   | EventSink      | `log` facade                   |
//! | `time`       | Clock          | wall clock / manual test clock |
//! | `identity`   | (helper)       | transport credentials          |

pub mod identity;
pub mod json_store;
pub mod log_sink;
pub mod memory;
pub mod save_queue;
pub mod time;
