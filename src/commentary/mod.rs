//! Commentary module - per-row performance sentences

mod calculator;

pub use calculator::{
    direction, parse_number, percent_difference, CommentaryCalculator, MetricField, MetricValues,
    OmissionReason, RowCommentary,
};
