//! The evaluation engine: a pure time/indicator core ([`time_agg`],
//! [`indicators`], [`composer`]) plus [`scanner`], the async cycle driver
//! that feeds it.

pub mod composer;
pub mod indicators;
pub mod scanner;
pub mod time_agg;
