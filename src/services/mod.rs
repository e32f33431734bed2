pub mod keepalive;

pub use keepalive::KeepAlive;
