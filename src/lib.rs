pub mod codec;
pub mod error;
pub mod lock;
pub mod logging;
pub mod model;
pub mod ops;
pub mod output;
pub mod store;
pub mod validate;

pub use error::{CodecError, Error, Result, ValidationError};
pub use model::{StatusFilter, Task};
pub use store::{JsonStore, StoreConfig};
