//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to                     |
//! |---------------|--------------|---------------------------------|
//! | `log_sink`    | EventSink    | `log` facade / serial console   |
//! | `record_file` | RecordSink   | Append-only file (SPIFFS)       |
//! | `time`        | Clock        | ESP32 system timer              |
//! |               | DelayNs      | `std::thread::sleep` (host)     |

pub mod log_sink;
pub mod record_file;
pub mod time;
