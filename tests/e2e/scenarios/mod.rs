mod history;
mod merging;
mod sharing;
