pub mod error;
pub mod formats;
pub mod fs;

pub use error::{ClientError, ClientResult, ErrorKind, ImagifyError, ImagifyResult, InputError};
pub use formats::{ImageFormat, format_from_extension};
pub use fs::{read_source_image, save_payload};
