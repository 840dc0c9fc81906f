pub mod clock;
pub mod io;
pub mod logging;
pub mod time;
