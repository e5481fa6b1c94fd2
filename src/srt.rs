use std::time::Duration;

#[derive(Debug, PartialEq)]
pub enum Line<'a> {
    Timestamp(Duration),
    Caption(&'a str),
}

#[derive(Debug, PartialEq)]
pub struct CaptionBlock {
    pub(crate) show_at: Duration,
    pub(crate) next_at: Option<Duration>,
    pub(crate) text: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub struct Cue {
    pub(crate) sequence_number: usize,
    pub(crate) show_at: Duration,
    pub(crate) hide_at: Duration,
    pub(crate) text: String,
}
