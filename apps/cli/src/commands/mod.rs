//! One module per `nebula` sub-command.

pub mod run;
pub mod serve;
pub mod validate;
