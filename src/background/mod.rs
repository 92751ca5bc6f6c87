pub mod poll_loop;

pub use poll_loop::PollLoop;
