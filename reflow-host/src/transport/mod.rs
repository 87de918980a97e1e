//! Serial transports available on the host

pub mod tty;

pub use tty::TtyOpener;
