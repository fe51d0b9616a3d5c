pub mod verifier;

pub use verifier::{check, hash, hash_file, hash_file_blocking, verify, IntegrityError};
