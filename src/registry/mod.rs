//! Concurrent stores and the operations that mutate them.
//!
//! Each store guards its own records; the resolver composes the ledger,
//! the attempt register and the result book into one atomic resolution.

mod attempts;
mod calendar;
mod grace_ledger;
mod resolver;
mod results;

pub use attempts::ReappearRegister;
pub use calendar::ExamCalendar;
pub use grace_ledger::GraceLedger;
pub use resolver::{ReappearOutcome, ReappearResolver};
pub use results::ResultBook;
