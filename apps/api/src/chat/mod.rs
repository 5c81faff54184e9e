pub mod handlers;
pub mod intent;
pub mod stream;
