use crate::srt::{CaptionBlock, Cue};

use std::time::Duration;

use clap::ValueEnum;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum EndTime {
    Next,
    Fixed,
}

pub struct ProcessOpts {
    pub end_time: EndTime,
    pub duration: Duration,
}

impl Default for ProcessOpts {
    fn default() -> Self {
        Self {
            end_time: EndTime::Next,
            duration: Duration::from_secs(2),
        }
    }
}

pub fn process(blocks: Vec<CaptionBlock>, opts: &ProcessOpts) -> Vec<Cue> {
    let mut seqnum = 0;
    blocks
        .into_iter()
        .map(|block| {
            seqnum += 1;
            Cue {
                sequence_number: seqnum,
                show_at: block.show_at,
                hide_at: hide_at(&block, opts),
                text: block.text.join(" "),
            }
        })
        .collect()
}

fn hide_at(block: &CaptionBlock, opts: &ProcessOpts) -> Duration {
    let fallback = block.show_at.saturating_add(opts.duration);
    match (opts.end_time, block.next_at) {
        (EndTime::Next, Some(next_at)) if next_at > block.show_at => next_at,
        (EndTime::Next, Some(next_at)) => {
            debug!(
                show_at = ?block.show_at,
                next_at = ?next_at,
                "Next timestamp is not after the start, using the fallback duration"
            );
            fallback
        }
        _ => fallback,
    }
}
